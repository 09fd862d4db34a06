//! 3x4 matrix keypad scanner
//!
//! Rows are driven low one at a time, columns read with pull-ups. A key
//! is reported once per press: it must be released before it can be
//! reported again.
//!
//! ```text
//!        C0  C1  C2
//! R0     1   2   3
//! R1     4   5   6
//! R2     7   8   9
//! R3     *   0   #
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::keypad::{Key, Keypad};

/// ASCII key code at [row][column]
pub const KEY_LAYOUT: [[u8; 3]; 4] = [*b"123", *b"456", *b"789", *b"*0#"];

/// Column settle time after driving a row
const SETTLE_US: u32 = 10;

/// Matrix keypad on 4 row outputs and 3 column inputs
pub struct MatrixKeypad<R, C, D> {
    rows: [R; 4],
    cols: [C; 3],
    delay: D,
    held: Option<Key>,
    pending: Option<Key>,
}

impl<R: OutputPin, C: InputPin, D: DelayNs> MatrixKeypad<R, C, D> {
    /// Take the pins and park all rows high
    pub fn new(mut rows: [R; 4], cols: [C; 3], delay: D) -> Self {
        for row in rows.iter_mut() {
            let _ = row.set_high();
        }
        Self {
            rows,
            cols,
            delay,
            held: None,
            pending: None,
        }
    }

    /// Key currently held down, first in scan order
    ///
    /// Pin errors read as "not pressed".
    pub fn scan(&mut self) -> Option<Key> {
        let mut found = None;
        for (r, layout_row) in KEY_LAYOUT.iter().enumerate() {
            let _ = self.rows[r].set_low();
            self.delay.delay_us(SETTLE_US);
            for (c, &code) in layout_row.iter().enumerate() {
                if found.is_none() && self.cols[c].is_low().unwrap_or(false) {
                    found = Key::from_ascii(code);
                }
            }
            let _ = self.rows[r].set_high();
        }
        found
    }
}

impl<R: OutputPin, C: InputPin, D: DelayNs> Keypad for MatrixKeypad<R, C, D> {
    fn key_available(&mut self) -> bool {
        if self.pending.is_none() {
            let now = self.scan();
            if now.is_some() && now != self.held {
                self.pending = now;
            }
            self.held = now;
        }
        self.pending.is_some()
    }

    fn read_key(&mut self) -> Option<Key> {
        self.key_available();
        self.pending.take()
    }
}
