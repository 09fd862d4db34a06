//! Line buffer for console input

/// Longest accepted command line
pub const LINE_SIZE: usize = 64;

/// Line input buffer
///
/// Printable ASCII only; bytes past `LINE_SIZE` are refused.
pub struct LineBuffer {
    buf: [u8; LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_SIZE],
            len: 0,
        }
    }

    /// Append a character. Returns `false` if the line is full.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < LINE_SIZE {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove last character. Returns `false` on an empty line.
    pub fn backspace(&mut self) -> bool {
        if self.len > 0 {
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Buffer length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if no more characters fit
    pub fn is_full(&self) -> bool {
        self.len == LINE_SIZE
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
