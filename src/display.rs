//! Module: display
//!
//! Purpose: Character display collaborator and the status screen.
//!
//! Architecture:
//! - `Display`: command/data byte primitives (HD44780 instruction set)
//! - `LcdPosition`: named cursor positions of the status screen
//! - `render_status`: full redraw; the control loop patches single fields
//! - `CharLcd`: in-memory 2x16 model used by the simulator and tests
//!
//! Screen layout (16 columns):
//! ```text
//! 0         1
//! 0123456789012345
//! SQU 100 Hz LAST
//! 50% DUTY   '#'
//! ```

use crate::keypad::Key;
use crate::params::{DutyCycle, FrequencyIndex, Params, Shape};

/// Clear display instruction
pub const CLEAR_DISPLAY: u8 = 0x01;
/// Return home instruction
pub const RETURN_HOME: u8 = 0x02;
/// Set DDRAM address instruction (OR with the address)
pub const SET_DDRAM_ADDR: u8 = 0x80;

/// Status screen cursor positions
///
/// Each value is the full "set DDRAM address" instruction.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdPosition {
    /// Row 0, column 0: shape label
    Home = 0x80,
    /// Row 0, column 4: frequency digits
    Frequency = 0x84,
    /// Row 0, column 8: "Hz"
    HzLabel = 0x88,
    /// Row 0, column 11: "LAST"
    LastLabel = 0x8B,
    /// Row 1, column 0: duty tens digit
    NewLine = 0xC0,
    /// Row 1, column 4: "DUTY"
    DutyLabel = 0xC4,
    /// Row 1, column 11: quotes around the last key
    KeyQuote = 0xCB,
    /// Row 1, column 12: last key pressed
    LastKey = 0xCC,
}

impl LcdPosition {
    /// Instruction byte for this position
    #[inline]
    pub const fn command(self) -> u8 {
        self as u8
    }
}

/// Character display
pub trait Display {
    /// Send an instruction byte
    fn write_command(&mut self, command: u8);

    /// Write one character at the cursor
    fn write_data(&mut self, data: u8);

    /// Write a string at the cursor
    fn write_text(&mut self, text: &str) {
        for b in text.bytes() {
            self.write_data(b);
        }
    }

    /// Move the cursor to a named position
    fn move_to(&mut self, pos: LcdPosition) {
        self.write_command(pos.command());
    }
}

impl<D: Display + ?Sized> Display for &mut D {
    fn write_command(&mut self, command: u8) {
        (**self).write_command(command)
    }

    fn write_data(&mut self, data: u8) {
        (**self).write_data(data)
    }
}

/// Show the shape label
pub fn show_shape(display: &mut impl Display, shape: Shape) {
    display.move_to(LcdPosition::Home);
    display.write_text(shape.label());
}

/// Show the frequency digits
pub fn show_frequency(display: &mut impl Display, frequency: FrequencyIndex) {
    display.move_to(LcdPosition::Frequency);
    display.write_text(frequency.label());
}

/// Show the duty tens digit
pub fn show_duty(display: &mut impl Display, duty: DutyCycle) {
    display.move_to(LcdPosition::NewLine);
    display.write_data(duty.digit());
}

/// Echo the last accepted key
pub fn show_last_key(display: &mut impl Display, key: Key) {
    display.move_to(LcdPosition::LastKey);
    display.write_data(key.as_ascii());
}

/// Clear and draw the whole status screen
pub fn render_status(display: &mut impl Display, params: &Params) {
    display.write_command(CLEAR_DISPLAY);

    show_shape(display, params.shape);
    show_frequency(display, params.frequency);
    display.move_to(LcdPosition::HzLabel);
    display.write_text("Hz");
    display.move_to(LcdPosition::LastLabel);
    display.write_text("LAST");

    show_duty(display, params.duty);
    display.write_text("0%");
    display.move_to(LcdPosition::DutyLabel);
    display.write_text("DUTY");
    display.move_to(LcdPosition::KeyQuote);
    display.write_text("' '");
}

/// Visible columns per row
pub const LCD_COLUMNS: usize = 16;
/// Visible rows
pub const LCD_ROWS: usize = 2;

/// DDRAM start address of each row
const ROW_ADDR: [u8; LCD_ROWS] = [0x00, 0x40];

/// In-memory 2x16 character display
///
/// Interprets clear, home and set-address instructions; everything else
/// is accepted and ignored. Writes past column 15 are dropped.
pub struct CharLcd {
    cells: [[u8; LCD_COLUMNS]; LCD_ROWS],
    addr: u8,
}

impl CharLcd {
    /// Blank display
    pub const fn new() -> Self {
        Self {
            cells: [[b' '; LCD_COLUMNS]; LCD_ROWS],
            addr: 0,
        }
    }

    /// Text of one row (trailing blanks included)
    pub fn row(&self, row: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| core::str::from_utf8(r).ok())
            .unwrap_or("")
    }

    fn cell_mut(&mut self) -> Option<&mut u8> {
        let row = ROW_ADDR.iter().rposition(|&start| self.addr >= start)?;
        let col = (self.addr - ROW_ADDR[row]) as usize;
        self.cells[row].get_mut(col)
    }
}

impl Default for CharLcd {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CharLcd {
    fn write_command(&mut self, command: u8) {
        if command & SET_DDRAM_ADDR != 0 {
            self.addr = command & !SET_DDRAM_ADDR;
        } else if command == CLEAR_DISPLAY {
            self.cells = [[b' '; LCD_COLUMNS]; LCD_ROWS];
            self.addr = 0;
        } else if command & 0xFE == RETURN_HOME {
            self.addr = 0;
        }
    }

    fn write_data(&mut self, data: u8) {
        if let Some(cell) = self.cell_mut() {
            *cell = data;
        }
        self.addr = self.addr.wrapping_add(1) & 0x7F;
    }
}

impl core::fmt::Display for CharLcd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "+----------------+")?;
        for row in 0..LCD_ROWS {
            writeln!(f, "|{}|", self.row(row))?;
        }
        write!(f, "+----------------+")
    }
}
