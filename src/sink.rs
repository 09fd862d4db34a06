//! Module: sink
//!
//! Purpose: Output side of the dispatcher. Converts table levels to DAC
//! codes and hands them to a non-blocking sink.
//!
//! Architecture:
//! - `DacCalibration::to_code`: level (1/100 V) -> 12-bit code, saturating
//! - `DacFrame`: MCP4921 16-bit word (command nibble | code)
//! - `SampleSink`: `try_send` contract, no blocking, no retry
//! - `CaptureSink`: fixed-capacity recorder for simulation and tests
//!
//! Safety: RT-safe. No allocation, no blocking.

use crate::config::{DacCalibration, DAC_MAX_CODE};

/// 12-bit DAC input code (0..=4095)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DacCode(u16);

impl DacCode {
    /// Zero output
    pub const ZERO: Self = Self(0);
    /// Full scale
    pub const MAX: Self = Self(DAC_MAX_CODE);

    /// Create from a raw value, clamped to 12 bits
    #[inline]
    pub const fn saturating(raw: u32) -> Self {
        if raw > DAC_MAX_CODE as u32 {
            Self::MAX
        } else {
            Self(raw as u16)
        }
    }

    /// Raw code
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl DacCalibration {
    /// Convert a table level to a DAC code
    ///
    /// Saturates at 0 below the calibration offset and at full scale above
    /// the reference.
    #[inline]
    pub const fn to_code(&self, level: u16) -> DacCode {
        let scaled = self.scale * level as u32 / self.reference;
        DacCode::saturating(scaled.saturating_sub(self.offset))
    }
}

/// MCP4921 write command
///
/// Bit layout:
/// ```text
/// [15] A/B = 0 (DAC A)
/// [14] BUF = 0 (unbuffered Vref)
/// [13] GA  = 1 (1x gain)
/// [12] SHDN = 1 (output active)
/// [11:0] code
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DacFrame(u16);

impl DacFrame {
    /// Fixed command prefix
    pub const COMMAND: u16 = 0x3000;

    /// Build a frame for `code`
    #[inline]
    pub const fn new(code: DacCode) -> Self {
        Self(Self::COMMAND | code.get())
    }

    /// 16-bit word
    #[inline]
    pub const fn word(self) -> u16 {
        self.0
    }

    /// Bytes in transmit order (MSB first)
    #[inline]
    pub const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

/// Analog output collaborator
///
/// # Contract
///
/// Must not block and must be callable from the tick context. Returns
/// `false` if the output is busy; the caller drops the sample.
pub trait SampleSink {
    /// Offer one code to the output
    fn try_send(&mut self, code: DacCode) -> bool;
}

impl<S: SampleSink + ?Sized> SampleSink for &mut S {
    #[inline]
    fn try_send(&mut self, code: DacCode) -> bool {
        (**self).try_send(code)
    }
}

/// Recording sink with fixed capacity
///
/// Accepts codes until full, then reports busy. Can also be forced busy
/// to exercise the drop path.
pub struct CaptureSink<const N: usize> {
    codes: [DacCode; N],
    len: usize,
    busy: bool,
}

impl<const N: usize> CaptureSink<N> {
    /// Create empty sink
    pub const fn new() -> Self {
        Self {
            codes: [DacCode::ZERO; N],
            len: 0,
            busy: false,
        }
    }

    /// Force the busy state
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Codes accepted so far
    pub fn codes(&self) -> &[DacCode] {
        &self.codes[..self.len]
    }

    /// Most recent accepted code
    pub fn last(&self) -> Option<DacCode> {
        self.codes().last().copied()
    }

    /// Number of accepted codes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing was accepted
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget recorded codes
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for CaptureSink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleSink for CaptureSink<N> {
    #[inline]
    fn try_send(&mut self, code: DacCode) -> bool {
        if self.busy || self.len >= N {
            return false;
        }
        self.codes[self.len] = code;
        self.len += 1;
        true
    }
}
