//! Hardware drivers for RustWavegen.
//!
//! Thin `embedded-hal` 1.0 drivers behind the core traits (the DAC uses
//! the non-blocking `embedded-hal-nb` SPI).
//! Generator logic stays in core modules, HAL only moves bits.

pub mod dac;
pub mod keypad;
pub mod lcd;

pub use dac::Mcp4921;
pub use keypad::{MatrixKeypad, KEY_LAYOUT};
pub use lcd::{Hd44780, LcdError};
