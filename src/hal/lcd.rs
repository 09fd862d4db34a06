//! HD44780 character LCD, 4-bit bus, write only (R/W tied low)
//!
//! Timing follows the datasheet worst case, so no busy-flag polling:
//! - 37 µs after a normal instruction or data write
//! - 1.52 ms after clear / return home

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::display::{Display, CLEAR_DISPLAY, RETURN_HOME};

/// Function set: 4-bit bus, 2 lines, 5x8 font
const FUNCTION_SET_4BIT_2LINE: u8 = 0x28;
/// Display on, cursor off, blink off
const DISPLAY_ON: u8 = 0x0C;
/// Entry mode: increment, no shift
const ENTRY_MODE_INC: u8 = 0x06;

const SHORT_WAIT_US: u32 = 40;
const LONG_WAIT_US: u32 = 1_600;

/// LCD init failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdError {
    /// A control or data pin could not be driven
    Pin,
}

/// HD44780 on six GPIOs: RS, E and D4..D7
pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Take the pins. `data` is D4, D5, D6, D7 in that order.
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Self {
        Self { rs, en, data, delay }
    }

    /// Power-up sequence, then blank display with cursor at home
    pub fn init(&mut self) -> Result<(), LcdError> {
        self.rs.set_low().map_err(|_| LcdError::Pin)?;
        self.en.set_low().map_err(|_| LcdError::Pin)?;
        self.delay.delay_ms(50);

        // Reset by instruction: three times 8-bit mode, then 4-bit
        self.nibble(0x3)?;
        self.delay.delay_us(4_500);
        self.nibble(0x3)?;
        self.delay.delay_us(150);
        self.nibble(0x3)?;
        self.delay.delay_us(150);
        self.nibble(0x2)?;
        self.delay.delay_us(SHORT_WAIT_US);

        for cmd in [FUNCTION_SET_4BIT_2LINE, DISPLAY_ON, CLEAR_DISPLAY, ENTRY_MODE_INC] {
            self.send(false, cmd)?;
        }
        Ok(())
    }

    /// Release pins and delay
    pub fn release(self) -> (P, P, [P; 4], D) {
        (self.rs, self.en, self.data, self.delay)
    }

    fn nibble(&mut self, value: u8) -> Result<(), LcdError> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_state(PinState::from(value & (1 << bit) != 0))
                .map_err(|_| LcdError::Pin)?;
        }
        self.en.set_high().map_err(|_| LcdError::Pin)?;
        self.delay.delay_us(1);
        self.en.set_low().map_err(|_| LcdError::Pin)?;
        Ok(())
    }

    fn send(&mut self, is_data: bool, byte: u8) -> Result<(), LcdError> {
        self.rs
            .set_state(PinState::from(is_data))
            .map_err(|_| LcdError::Pin)?;
        self.nibble(byte >> 4)?;
        self.nibble(byte & 0x0F)?;

        let slow = !is_data && (byte == CLEAR_DISPLAY || byte & 0xFE == RETURN_HOME);
        self.delay.delay_us(if slow { LONG_WAIT_US } else { SHORT_WAIT_US });
        Ok(())
    }
}

// Pins were proven by `init`; a later pin error only garbles the screen.
impl<P: OutputPin, D: DelayNs> Display for Hd44780<P, D> {
    fn write_command(&mut self, command: u8) {
        let _ = self.send(false, command);
    }

    fn write_data(&mut self, data: u8) {
        let _ = self.send(true, data);
    }
}
