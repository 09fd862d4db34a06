//! Keypad collaborator: key codes and the polling interface
//!
//! 3x4 matrix: digits, `*` and `#`.

/// One keypad key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// '0'..='9'
    Digit(Digit),
    /// '*'
    Star,
    /// '#'
    Hash,
}

/// Decimal digit, 0..=9
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Digit(u8);

impl Digit {
    /// Digit `d`, or `None` above 9
    #[inline]
    pub const fn new(d: u8) -> Option<Self> {
        if d <= 9 {
            Some(Self(d))
        } else {
            None
        }
    }

    /// Numeric value
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Key {
    /// Digit key `d`, or `None` above 9
    pub const fn digit(d: u8) -> Option<Self> {
        match Digit::new(d) {
            Some(d) => Some(Key::Digit(d)),
            None => None,
        }
    }

    /// Parse an ASCII key code
    pub const fn from_ascii(c: u8) -> Option<Self> {
        match c {
            b'0'..=b'9' => Key::digit(c - b'0'),
            b'*' => Some(Key::Star),
            b'#' => Some(Key::Hash),
            _ => None,
        }
    }

    /// ASCII key code
    pub const fn as_ascii(self) -> u8 {
        match self {
            Key::Digit(d) => b'0' + d.get(),
            Key::Star => b'*',
            Key::Hash => b'#',
        }
    }
}

/// Debounced keypad
pub trait Keypad {
    /// True if a new keypress is waiting
    fn key_available(&mut self) -> bool;

    /// Take the waiting key, if any
    fn read_key(&mut self) -> Option<Key>;
}

/// Keypad that replays a fixed byte string
///
/// Bytes that are not key codes are skipped.
pub struct KeyScript<'a> {
    keys: &'a [u8],
    pos: usize,
}

impl<'a> KeyScript<'a> {
    /// Replay `keys` in order
    pub const fn new(keys: &'a [u8]) -> Self {
        Self { keys, pos: 0 }
    }
}

impl Keypad for KeyScript<'_> {
    fn key_available(&mut self) -> bool {
        while self.pos < self.keys.len() {
            if Key::from_ascii(self.keys[self.pos]).is_some() {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    fn read_key(&mut self) -> Option<Key> {
        if !self.key_available() {
            return None;
        }
        let key = Key::from_ascii(self.keys[self.pos]);
        self.pos += 1;
        key
    }
}
