//! Module: params
//!
//! Purpose: Waveform parameter types shared by the control loop and the
//! sample dispatcher.
//!
//! Architecture:
//! - `Shape` selects a table and its wrap period
//! - `FrequencyIndex` is the per-tick cursor step (1..=5)
//! - `DutyCycle` is the square threshold counter, bounded at construction
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

use crate::config::{
    BASE_FREQUENCY_HZ, DUTY_DEFAULT, DUTY_MAX, DUTY_MIN, DUTY_STEP, SAWTOOTH_PERIOD,
    SINE_PERIOD, SQUARE_PERIOD, TRIANGLE_PERIOD,
};

/// Output waveform shape
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Two-level step, duty adjustable
    Square = 0,
    /// Sinusoid (table holds two cycles)
    Sine = 1,
    /// Piecewise-linear up/down ramp
    Triangle = 2,
    /// Single ascending ramp
    Sawtooth = 3,
}

impl Shape {
    /// All shapes, in table order.
    pub const ALL: [Shape; 4] = [Shape::Square, Shape::Sine, Shape::Triangle, Shape::Sawtooth];

    /// Number of ticks (at step 1) before the cursor wraps to 0.
    #[inline]
    pub const fn period(self) -> usize {
        match self {
            Shape::Square => SQUARE_PERIOD,
            Shape::Sine => SINE_PERIOD,
            Shape::Triangle => TRIANGLE_PERIOD,
            Shape::Sawtooth => SAWTOOTH_PERIOD,
        }
    }

    /// Three-letter display label.
    pub const fn label(self) -> &'static str {
        match self {
            Shape::Square => "SQU",
            Shape::Sine => "SIN",
            Shape::Triangle => "TRI",
            Shape::Sawtooth => "SAW",
        }
    }

    /// Lower-case console name.
    pub const fn name(self) -> &'static str {
        match self {
            Shape::Square => "square",
            Shape::Sine => "sine",
            Shape::Triangle => "triangle",
            Shape::Sawtooth => "sawtooth",
        }
    }

    /// Parse a console name (full name or display label, any case).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name) || s.label().eq_ignore_ascii_case(name))
    }

    /// Convert from u8
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Sine,
            2 => Self::Triangle,
            3 => Self::Sawtooth,
            _ => Self::Square,
        }
    }
}

/// Frequency preset, 1..=5 (100 Hz steps)
///
/// Used as the per-tick cursor step: the tables are fixed length and the
/// tick rate is fixed, so skipping samples is what raises the frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrequencyIndex(u8);

impl FrequencyIndex {
    /// Lowest preset (100 Hz)
    pub const MIN: Self = Self(1);
    /// Highest preset (500 Hz)
    pub const MAX: Self = Self(5);

    /// Create from a preset number, `None` outside 1..=5
    pub const fn new(n: u8) -> Option<Self> {
        if n >= Self::MIN.0 && n <= Self::MAX.0 {
            Some(Self(n))
        } else {
            None
        }
    }

    /// Create from a preset number, clamped into 1..=5
    pub const fn clamped(n: u8) -> Self {
        if n < Self::MIN.0 {
            Self::MIN
        } else if n > Self::MAX.0 {
            Self::MAX
        } else {
            Self(n)
        }
    }

    /// Preset number
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Cursor advance per tick
    #[inline]
    pub const fn step(self) -> usize {
        self.0 as usize
    }

    /// Nominal output frequency
    pub const fn hz(self) -> u32 {
        self.0 as u32 * BASE_FREQUENCY_HZ
    }

    /// Three-digit display text
    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "100",
            2 => "200",
            3 => "300",
            4 => "400",
            _ => "500",
        }
    }
}

impl Default for FrequencyIndex {
    fn default() -> Self {
        Self::MIN
    }
}

/// Direction of a single duty adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyStep {
    /// One step down (`*`)
    Down,
    /// One step up (`#`)
    Up,
}

/// Square wave duty threshold
///
/// Stored as the number of high samples in the square table, not as a
/// percentage. Legal values sit on the grid `MIN + k * STEP` up to `MAX`;
/// there is no way to construct anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DutyCycle(u16);

impl DutyCycle {
    /// 50 % equivalent
    pub const DEFAULT: Self = Self(DUTY_DEFAULT);
    /// 10 %
    pub const MIN: Self = Self(DUTY_MIN);
    /// 90 %
    pub const MAX: Self = Self(DUTY_MAX);
    /// Counter increment for one 10 % step
    pub const STEP: u16 = DUTY_STEP;

    /// Create from a raw threshold. Must lie on the step grid.
    pub const fn from_threshold(raw: u16) -> Option<Self> {
        if raw < DUTY_MIN || raw > DUTY_MAX || (raw - DUTY_MIN) % DUTY_STEP != 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Create from a step number, 1 (10 %) ..= 9 (90 %)
    pub const fn from_step(step: u8) -> Option<Self> {
        if step == 0 {
            return None;
        }
        Self::from_threshold(DUTY_MIN + (step as u16 - 1) * DUTY_STEP)
    }

    /// Number of high samples in the square table
    #[inline]
    pub const fn threshold(self) -> usize {
        self.0 as usize
    }

    /// Step number, 1..=9
    pub const fn step_index(self) -> u8 {
        ((self.0 - DUTY_MIN) / DUTY_STEP + 1) as u8
    }

    /// Nominal duty in percent (10..=90)
    pub const fn percent(self) -> u8 {
        self.step_index() * 10
    }

    /// Tens digit shown on the display ('1'..='9')
    pub const fn digit(self) -> u8 {
        b'0' + self.step_index()
    }

    /// One step up/down, `None` at the bound
    pub const fn stepped(self, dir: DutyStep) -> Option<Self> {
        match dir {
            DutyStep::Up if self.0 < DUTY_MAX => Some(Self(self.0 + DUTY_STEP)),
            DutyStep::Down if self.0 > DUTY_MIN => Some(Self(self.0 - DUTY_STEP)),
            _ => None,
        }
    }
}

impl Default for DutyCycle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Snapshot of the generator parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub shape: Shape,
    pub frequency: FrequencyIndex,
    pub duty: DutyCycle,
}

impl Params {
    /// Power-up state: 100 Hz square at 50 %
    pub const DEFAULT: Self = Self {
        shape: Shape::Square,
        frequency: FrequencyIndex::MIN,
        duty: DutyCycle::DEFAULT,
    };
}

impl Default for Params {
    fn default() -> Self {
        Self::DEFAULT
    }
}
