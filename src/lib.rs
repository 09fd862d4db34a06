//! # RustWavegen
//!
//! Keypad-controlled function generator: sine, triangle, sawtooth and
//! square waves from precomputed tables, played through a 12-bit SPI DAC
//! at a fixed tick rate.
//!
//! ## Architecture
//!
//! ```text
//! Keypad / Console ──▶ ControlState ◀── SampleDispatcher ──▶ SampleSink (DAC)
//!   (foreground)       (critical        (tick context)
//!        │              section)
//!        └──▶ Display
//! ```
//!
//! The foreground and the tick share nothing but [`ControlState`] and the
//! immutable tables. The dispatcher never blocks, allocates or logs.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod control;
pub mod dispatcher;
pub mod display;
pub mod fault;
pub mod hal;
pub mod keypad;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod params;
pub mod sink;
pub mod state;
pub mod timer;
pub mod wave;

pub use config::DacCalibration;
pub use control::{Action, ControlLoop, KeyEvent};
pub use dispatcher::{PlaybackCursor, SampleDispatcher, TickOutcome};
pub use display::{CharLcd, Display, LcdPosition};
pub use fault::{halt, InitError};
pub use keypad::{Digit, Key, KeyScript, Keypad};
pub use log_globals::{BG_LOG_STREAM, RT_LOG_STREAM};
pub use params::{DutyCycle, DutyStep, FrequencyIndex, Params, Shape};
pub use sink::{CaptureSink, DacCode, DacFrame, SampleSink};
pub use state::{ControlState, Rejection};
pub use timer::{TickLatch, TickTimer};
pub use wave::WaveformTable;
