//! Waveform tables
//!
//! Architecture:
//! - Sine, sawtooth and triangle: built at compile time, immutable statics
//! - Square: owned by `ControlState`, rebuilt in place on duty change
//! - Lookup by shape is a `match`, never a raw table index

pub mod lut;
pub mod table;

pub use table::{
    sawtooth_level, sine_level, square_level, triangle_level, WaveformTable,
};

use crate::config::{SAWTOOTH_LEN, SINE_LEN, TRIANGLE_LEN};

/// Two-cycle sine table
pub static SINE_TABLE: WaveformTable<SINE_LEN> = WaveformTable::sine();

/// Sawtooth ramp table
pub static SAWTOOTH_TABLE: WaveformTable<SAWTOOTH_LEN> = WaveformTable::sawtooth();

/// Triangle table
pub static TRIANGLE_TABLE: WaveformTable<TRIANGLE_LEN> = WaveformTable::triangle();
