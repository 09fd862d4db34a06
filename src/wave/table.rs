//! Fixed-length waveform tables and their builders
//!
//! Every builder is a per-index `const fn`, used both by the `const`
//! constructors (compile-time statics) and by the in-place `build_*`
//! methods (runtime rebuilds).

use super::lut::{const_sin, round_level};
use crate::config::{
    SAWTOOTH_SLOPE, SINE_AMPLITUDE, SINE_DC_OFFSET, SQUARE_HIGH, SQUARE_LOW,
    TRIANGLE_FALL_INTERCEPT, TRIANGLE_FALL_SLOPE, TRIANGLE_FALL_START, TRIANGLE_RISE_END,
    TRIANGLE_RISE_SLOPE,
};
use crate::params::DutyCycle;
use core::f64::consts::PI;

/// Sine level at `i` in a table of `len` samples holding two cycles.
pub const fn sine_level(i: usize, len: usize) -> u16 {
    let angle = 2.0 * PI * 2.0 * (i as f64) / (len as f64);
    round_level(SINE_AMPLITUDE * const_sin(angle) + SINE_DC_OFFSET)
}

/// Square level at `i`: high below the duty threshold, low from it on.
#[inline]
pub const fn square_level(i: usize, threshold: usize) -> u16 {
    if i < threshold {
        SQUARE_HIGH
    } else {
        SQUARE_LOW
    }
}

/// Sawtooth level at `i`. The dispatcher's wrap makes it repeat.
pub const fn sawtooth_level(i: usize) -> u16 {
    // float -> int casts saturate and truncate
    (SAWTOOTH_SLOPE * i as f64) as u16
}

/// Triangle level at `i`.
///
/// Two segments: rising below `TRIANGLE_RISE_END`, falling above
/// `TRIANGLE_FALL_START`. Anything strictly between the two stays 0; with
/// the shipping breakpoints (100 and 90) that region is empty. The falling
/// segment saturates at 0 past its zero crossing.
pub const fn triangle_level(i: usize) -> u16 {
    if i < TRIANGLE_RISE_END {
        (TRIANGLE_RISE_SLOPE * i as f64) as u16
    } else if i > TRIANGLE_FALL_START {
        (TRIANGLE_FALL_INTERCEPT - TRIANGLE_FALL_SLOPE * i as f64) as u16
    } else {
        0
    }
}

/// Fixed-length table of output levels (hundredths of a volt)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveformTable<const N: usize> {
    levels: [u16; N],
}

impl<const N: usize> WaveformTable<N> {
    /// All-zero table
    pub const fn silent() -> Self {
        Self { levels: [0; N] }
    }

    /// Two-cycle sine over the whole table
    pub const fn sine() -> Self {
        let mut levels = [0u16; N];
        let mut i = 0;
        while i < N {
            levels[i] = sine_level(i, N);
            i += 1;
        }
        Self { levels }
    }

    /// Square with `duty` high samples
    pub const fn square(duty: DutyCycle) -> Self {
        let mut levels = [0u16; N];
        let threshold = duty.threshold();
        let mut i = 0;
        while i < N {
            levels[i] = square_level(i, threshold);
            i += 1;
        }
        Self { levels }
    }

    /// Single ascending ramp
    pub const fn sawtooth() -> Self {
        let mut levels = [0u16; N];
        let mut i = 0;
        while i < N {
            levels[i] = sawtooth_level(i);
            i += 1;
        }
        Self { levels }
    }

    /// Two-segment triangle
    pub const fn triangle() -> Self {
        let mut levels = [0u16; N];
        let mut i = 0;
        while i < N {
            levels[i] = triangle_level(i);
            i += 1;
        }
        Self { levels }
    }

    /// Refill in place with a sine
    pub fn build_sine(&mut self) {
        for (i, level) in self.levels.iter_mut().enumerate() {
            *level = sine_level(i, N);
        }
    }

    /// Refill in place with a square of the given duty
    ///
    /// The threshold is the duty counter itself. Range checks belong to
    /// the caller; `DutyCycle` cannot hold an out-of-range value.
    pub fn build_square(&mut self, duty: DutyCycle) {
        let threshold = duty.threshold();
        for (i, level) in self.levels.iter_mut().enumerate() {
            *level = square_level(i, threshold);
        }
    }

    /// Refill in place with a sawtooth
    pub fn build_sawtooth(&mut self) {
        for (i, level) in self.levels.iter_mut().enumerate() {
            *level = sawtooth_level(i);
        }
    }

    /// Refill in place with a triangle
    pub fn build_triangle(&mut self) {
        for (i, level) in self.levels.iter_mut().enumerate() {
            *level = triangle_level(i);
        }
    }

    /// Level at `index`, or 0 (silence) past the end.
    ///
    /// Never panics: this runs on the tick path.
    #[inline]
    pub fn level(&self, index: usize) -> u16 {
        self.levels.get(index).copied().unwrap_or(0)
    }

    /// Storage length
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// True for a zero-length table
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// All levels
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.levels
    }
}

impl<const N: usize> Default for WaveformTable<N> {
    fn default() -> Self {
        Self::silent()
    }
}
