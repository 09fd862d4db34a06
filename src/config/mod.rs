//! Module: config
//!
//! Purpose: Compile-time configuration for the function generator.
//!
//! Architecture:
//! - Table geometry: storage length and wrap period per shape
//! - Levels in hundredths of a volt (what the tables hold)
//! - Duty counter bounds (pre-scaled threshold, not a percentage)
//! - Tick rate, debounce and DAC calibration
//!
//! Nothing here is mutable at runtime. All state resets at power-up.

/// Fixed tick rate of the sample dispatcher.
///
/// A 194-sample square table played at step 1 repeats at ~100 Hz.
pub const TICK_RATE_HZ: u32 = 19_500;

/// Output frequency at `FrequencyIndex` 1.
pub const BASE_FREQUENCY_HZ: u32 = 100;

/// Debounce wait after a duty-adjusting keypress (busy-wait).
pub const DEBOUNCE_US: u32 = 100_000;

// --- Table geometry ---

/// Sine table length (two full cycles).
pub const SINE_LEN: usize = 392;
/// Sine wrap period.
pub const SINE_PERIOD: usize = 392;

/// Square table length.
pub const SQUARE_LEN: usize = 194;
/// Square wrap period.
pub const SQUARE_PERIOD: usize = 194;

/// Sawtooth table storage. Only the first `SAWTOOTH_PERIOD` entries play.
pub const SAWTOOTH_LEN: usize = 360;
/// Sawtooth wrap period.
pub const SAWTOOTH_PERIOD: usize = 195;

/// Triangle table storage. Only the first `TRIANGLE_PERIOD` entries play.
pub const TRIANGLE_LEN: usize = 350;
/// Triangle wrap period.
pub const TRIANGLE_PERIOD: usize = 195;

// --- Levels (hundredths of a volt) ---

/// Sine amplitude.
pub const SINE_AMPLITUDE: f64 = 152.0;
/// Sine DC offset.
pub const SINE_DC_OFFSET: f64 = 154.0;

/// Square high level (3.08 V).
pub const SQUARE_HIGH: u16 = 308;
/// Square low level. Kept one step above zero so the DAC code stays positive.
pub const SQUARE_LOW: u16 = 1;

/// Sawtooth ramp slope per index.
pub const SAWTOOTH_SLOPE: f64 = 1.6;

/// Triangle rising slope per index.
pub const TRIANGLE_RISE_SLOPE: f64 = 3.1;
/// Triangle falling slope per index.
pub const TRIANGLE_FALL_SLOPE: f64 = 3.18;
/// Intercept of the falling segment (6.20 V).
pub const TRIANGLE_FALL_INTERCEPT: f64 = 620.0;
/// Indices below this use the rising segment.
pub const TRIANGLE_RISE_END: usize = 100;
/// Indices above this (and not rising) use the falling segment.
pub const TRIANGLE_FALL_START: usize = 90;

// --- Duty counter ---

/// Reset value of the duty counter (the "50 %" threshold).
pub const DUTY_DEFAULT: u16 = 98;
/// One 10 % step of the duty counter.
pub const DUTY_STEP: u16 = 19;
/// Smallest legal duty counter (10 %).
pub const DUTY_MIN: u16 = 22;
/// Largest legal duty counter (90 %).
pub const DUTY_MAX: u16 = 174;

// --- DAC ---

/// Full-scale DAC code.
pub const DAC_MAX_CODE: u16 = 0x0FFF;

/// Level-to-code calibration for the DAC.
///
/// `code = scale * level / reference - offset`, saturating at both ends.
/// The offset was found empirically on the bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DacCalibration {
    /// Codes per full reference (12-bit: 4096)
    pub scale: u32,
    /// Reference voltage in hundredths of a volt
    pub reference: u32,
    /// Subtracted after scaling
    pub offset: u32,
}

impl DacCalibration {
    /// Bench calibration for a 3.3 V reference.
    pub const DEFAULT: Self = Self {
        scale: 4096,
        reference: 330,
        offset: 4,
    };
}

impl Default for DacCalibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}
