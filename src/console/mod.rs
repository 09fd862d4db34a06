//! Serial console for live control and diagnostics
//!
//! Polled from the foreground loop, no task of its own.
//! No heap: fixed line buffer, output through `core::fmt::Write`.
//!
//! Mirrors the keypad actions and adds `shape sawtooth`, which has no key.

pub mod commands;
pub mod console;
pub mod error;
pub mod line_buffer;
pub mod parser;

pub use commands::{execute, COMMANDS};
pub use console::{Console, PROMPT, VERSION};
pub use error::ConsoleError;
pub use line_buffer::LineBuffer;
pub use parser::{parse_line, ParsedCommand};
