//! Console error types

use crate::state::Rejection;

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// E01: Unknown command
    UnknownCommand,
    /// E02: Argument not understood
    InvalidValue,
    /// E03: Missing required argument
    MissingArg,
    /// E04: Value outside its range, or duty already at its bound
    OutOfRange,
    /// E05: Duty change while not on the square wave
    SquareOnly,
}

impl ConsoleError {
    /// Error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidValue => "E02",
            Self::MissingArg => "E03",
            Self::OutOfRange => "E04",
            Self::SquareOnly => "E05",
        }
    }

    /// Error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::InvalidValue => "invalid value",
            Self::MissingArg => "missing argument",
            Self::OutOfRange => "out of range",
            Self::SquareOnly => "square wave only",
        }
    }
}

impl From<Rejection> for ConsoleError {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::NotSquare => Self::SquareOnly,
            Rejection::AtLimit => Self::OutOfRange,
        }
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
