//! Module: control
//!
//! Purpose: Foreground control loop. Polls the keypad, applies the mapped
//! action to the shared state and patches the status screen.
//!
//! Architecture:
//! - `Action::from_key`: fixed keypad map
//! - `apply`: the single path from an action to `ControlState`, shared
//!   with the serial console
//! - `ControlLoop::poll`: one keypad check; debounce busy-wait after an
//!   accepted duty key
//!
//! Rejected actions change nothing and leave the display untouched.

use embedded_hal::delay::DelayNs;

use crate::config::DEBOUNCE_US;
use crate::display::{self, Display};
use crate::keypad::{Key, Keypad};
use crate::log_globals::BG_LOG_STREAM;
use crate::params::{DutyStep, FrequencyIndex, Params, Shape};
use crate::state::{ControlState, Rejection};

/// Parameter change requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keys 1-5
    SetFrequency(FrequencyIndex),
    /// Keys 6 (sine), 7 (triangle), 8 (square)
    SetShape(Shape),
    /// Key 9: square, 100 Hz, 50 %
    ResetAll,
    /// `*` / `#`
    AdjustDuty(DutyStep),
    /// Key 0
    ResetDuty,
}

impl Action {
    /// Keypad map
    pub fn from_key(key: Key) -> Self {
        match key {
            Key::Digit(d) => match d.get() {
                n @ 1..=5 => Action::SetFrequency(FrequencyIndex::clamped(n)),
                6 => Action::SetShape(Shape::Sine),
                7 => Action::SetShape(Shape::Triangle),
                8 => Action::SetShape(Shape::Square),
                9 => Action::ResetAll,
                // 0
                _ => Action::ResetDuty,
            },
            Key::Star => Action::AdjustDuty(DutyStep::Down),
            Key::Hash => Action::AdjustDuty(DutyStep::Up),
        }
    }

    /// True for actions that change the duty counter
    pub fn is_duty(&self) -> bool {
        matches!(self, Action::AdjustDuty(_) | Action::ResetDuty)
    }
}

/// Apply an action to the shared state
///
/// Returns the parameters after the change, or why nothing changed.
pub fn apply(state: &ControlState, action: Action) -> Result<Params, Rejection> {
    match action {
        Action::SetFrequency(f) => state.set_frequency(f),
        Action::SetShape(s) => state.set_shape(s),
        Action::ResetAll => state.reset_all(),
        Action::AdjustDuty(dir) => {
            state.adjust_duty(dir)?;
        }
        Action::ResetDuty => {
            state.reset_duty()?;
        }
    }
    Ok(state.params())
}

/// Patch the status screen after an accepted action
pub fn show_action(display: &mut impl Display, action: Action, params: &Params) {
    match action {
        Action::SetFrequency(_) => display::show_frequency(display, params.frequency),
        Action::SetShape(_) => display::show_shape(display, params.shape),
        Action::ResetAll => display::render_status(display, params),
        Action::AdjustDuty(_) | Action::ResetDuty => display::show_duty(display, params.duty),
    }
}

/// One handled keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: Action,
    pub result: Result<Params, Rejection>,
}

/// Keypad-driven control loop
///
/// # Example
///
/// ```ignore
/// static STATE: ControlState = ControlState::new();
///
/// let mut control = ControlLoop::new(&STATE, keypad, lcd, Ets);
/// control.start();
/// loop {
///     control.poll(now_us());
/// }
/// ```
pub struct ControlLoop<'a, K: Keypad, D: Display, T: DelayNs> {
    state: &'a ControlState,
    keypad: K,
    display: D,
    delay: T,
}

impl<'a, K: Keypad, D: Display, T: DelayNs> ControlLoop<'a, K, D, T> {
    /// Create control loop
    pub fn new(state: &'a ControlState, keypad: K, display: D, delay: T) -> Self {
        Self {
            state,
            keypad,
            display,
            delay,
        }
    }

    /// Draw the status screen for the current state
    pub fn start(&mut self) {
        let params = self.state.params();
        display::render_status(&mut self.display, &params);
    }

    /// Redraw everything (after changes made outside the keypad)
    pub fn refresh(&mut self) {
        self.start();
    }

    /// Check the keypad once and handle at most one key
    ///
    /// # Returns
    ///
    /// - `Some(event)` - a key was read (accepted or rejected)
    /// - `None` - no key waiting
    pub fn poll(&mut self, now_us: i64) -> Option<KeyEvent> {
        if !self.keypad.key_available() {
            return None;
        }
        let key = self.keypad.read_key()?;
        let action = Action::from_key(key);
        let result = apply(self.state, action);

        match result {
            Ok(params) => {
                if action.is_duty() {
                    self.delay.delay_us(DEBOUNCE_US);
                }
                show_action(&mut self.display, action, &params);
                display::show_last_key(&mut self.display, key);
                crate::rt_info!(
                    BG_LOG_STREAM,
                    now_us,
                    "key {} -> {} {}Hz duty {}%",
                    key.as_ascii() as char,
                    params.shape.label(),
                    params.frequency.hz(),
                    params.duty.percent()
                );
            }
            Err(rejection) => {
                crate::rt_debug!(
                    BG_LOG_STREAM,
                    now_us,
                    "key {} ignored: {}",
                    key.as_ascii() as char,
                    rejection
                );
            }
        }

        Some(KeyEvent { key, action, result })
    }

    /// Borrow the display
    pub fn display(&self) -> &D {
        &self.display
    }
}
