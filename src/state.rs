//! Module: state
//!
//! Purpose: Mode/parameter state shared by the control loop (foreground)
//! and the sample dispatcher (tick context).
//!
//! Architecture:
//! - One `critical_section::Mutex<RefCell<_>>` holds the parameters and
//!   the square table together
//! - Every mutation, including duty + table rebuild, happens in a single
//!   critical section; the dispatcher reads in one as well
//! - The dispatcher never observes a new duty with a stale table
//!
//! Safety: Safe. Both sides run as tasks: on ESP-IDF the critical section
//! is esp-idf-hal's FreeRTOS recursive mutex, on the host the
//! `critical-section` std mutex. Neither is taken from interrupt context.

use core::cell::RefCell;
use critical_section::Mutex;

use crate::config::SQUARE_LEN;
use crate::dispatcher::PlaybackCursor;
use crate::params::{DutyCycle, DutyStep, FrequencyIndex, Params, Shape};
use crate::wave::{WaveformTable, SAWTOOTH_TABLE, SINE_TABLE, TRIANGLE_TABLE};

/// Why a parameter request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Duty changes need the square wave selected
    NotSquare,
    /// Duty already at its bound
    AtLimit,
}

impl Rejection {
    /// Short description
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotSquare => "square wave only",
            Self::AtLimit => "duty at limit",
        }
    }
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

struct Shared {
    params: Params,
    square: WaveformTable<SQUARE_LEN>,
}

/// Shared generator state
///
/// # Usage
///
/// ```ignore
/// static STATE: ControlState = ControlState::new();
///
/// // Control loop:
/// STATE.set_shape(Shape::Sine);
/// STATE.adjust_duty(DutyStep::Up)?;
///
/// // Tick context (via SampleDispatcher):
/// let (level, step) = STATE.fetch(&mut cursor);
/// ```
pub struct ControlState {
    shared: Mutex<RefCell<Shared>>,
}

impl ControlState {
    /// Power-up state: 100 Hz square at 50 %, square table prebuilt
    pub const fn new() -> Self {
        Self {
            shared: Mutex::new(RefCell::new(Shared {
                params: Params::DEFAULT,
                square: WaveformTable::square(DutyCycle::DEFAULT),
            })),
        }
    }

    /// Consistent snapshot of all parameters
    pub fn params(&self) -> Params {
        critical_section::with(|cs| self.shared.borrow(cs).borrow().params)
    }

    /// Switch the active shape
    ///
    /// The cursor is not touched here; the dispatcher re-clamps it against
    /// the new period on its next tick. Duty is kept as is.
    pub fn set_shape(&self, shape: Shape) {
        critical_section::with(|cs| {
            self.shared.borrow(cs).borrow_mut().params.shape = shape;
        });
    }

    /// Select a frequency preset. Takes effect on the next tick.
    pub fn set_frequency(&self, frequency: FrequencyIndex) {
        critical_section::with(|cs| {
            self.shared.borrow(cs).borrow_mut().params.frequency = frequency;
        });
    }

    /// Move the duty one step and rebuild the square table
    ///
    /// Rejected (state unchanged) when the square wave is not selected or
    /// the duty is already at the bound in that direction.
    pub fn adjust_duty(&self, dir: DutyStep) -> Result<DutyCycle, Rejection> {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow(cs).borrow_mut();
            if shared.params.shape != Shape::Square {
                return Err(Rejection::NotSquare);
            }
            let duty = shared.params.duty.stepped(dir).ok_or(Rejection::AtLimit)?;
            shared.params.duty = duty;
            shared.square.build_square(duty);
            Ok(duty)
        })
    }

    /// Return the duty to 50 % and rebuild the square table
    ///
    /// Square wave only, like every other duty change.
    pub fn reset_duty(&self) -> Result<DutyCycle, Rejection> {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow(cs).borrow_mut();
            if shared.params.shape != Shape::Square {
                return Err(Rejection::NotSquare);
            }
            shared.params.duty = DutyCycle::DEFAULT;
            shared.square.build_square(DutyCycle::DEFAULT);
            Ok(DutyCycle::DEFAULT)
        })
    }

    /// Back to power-up defaults (square, 100 Hz, 50 %)
    pub fn reset_all(&self) {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow(cs).borrow_mut();
            shared.params = Params::DEFAULT;
            shared.square.build_square(DutyCycle::DEFAULT);
        });
    }

    /// Fetch the level under the cursor for the active shape
    ///
    /// Wraps the cursor to 0 first if it is past the active period, then
    /// reads. Returns the level and the cursor step, both taken from the
    /// same snapshot. Does not advance the cursor.
    #[inline]
    pub fn fetch(&self, cursor: &mut PlaybackCursor) -> (u16, usize) {
        critical_section::with(|cs| {
            let shared = self.shared.borrow(cs).borrow();
            let Params { shape, frequency, .. } = shared.params;
            let index = cursor.claim(shape.period());
            let level = match shape {
                Shape::Square => shared.square.level(index),
                Shape::Sine => SINE_TABLE.level(index),
                Shape::Triangle => TRIANGLE_TABLE.level(index),
                Shape::Sawtooth => SAWTOOTH_TABLE.level(index),
            };
            (level, frequency.step())
        })
    }

    /// Inspect the square table together with the duty it was built for
    pub fn with_square<R>(&self, f: impl FnOnce(&WaveformTable<SQUARE_LEN>, DutyCycle) -> R) -> R {
        critical_section::with(|cs| {
            let shared = self.shared.borrow(cs).borrow();
            f(&shared.square, shared.params.duty)
        })
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high_count(state: &ControlState) -> usize {
        state.with_square(|table, _| {
            table.as_slice().iter().filter(|&&l| l == crate::config::SQUARE_HIGH).count()
        })
    }

    #[test]
    fn test_power_up_defaults() {
        let state = ControlState::new();
        assert_eq!(state.params(), Params::DEFAULT);
        assert_eq!(high_count(&state), DutyCycle::DEFAULT.threshold());
    }

    #[test]
    fn test_duty_requires_square() {
        let state = ControlState::new();
        state.set_shape(Shape::Triangle);

        assert_eq!(state.adjust_duty(DutyStep::Up), Err(Rejection::NotSquare));
        assert_eq!(state.reset_duty(), Err(Rejection::NotSquare));
        assert_eq!(state.params().duty, DutyCycle::DEFAULT);
    }

    #[test]
    fn test_duty_sticky_across_shapes() {
        let state = ControlState::new();
        state.adjust_duty(DutyStep::Down).unwrap();
        state.set_shape(Shape::Sine);
        state.set_shape(Shape::Square);

        assert_eq!(state.params().duty.threshold(), 79);
        assert_eq!(high_count(&state), 79);
    }

    #[test]
    fn test_fetch_wraps_before_read() {
        let state = ControlState::new();
        let mut cursor = PlaybackCursor::new();
        cursor.advance(Shape::Square.period());

        let (level, step) = state.fetch(&mut cursor);
        assert_eq!(cursor.index(), 0);
        assert_eq!(level, crate::config::SQUARE_HIGH);
        assert_eq!(step, 1);
    }
}
