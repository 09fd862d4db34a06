//! Console state machine: byte input, line editing, dispatch

use core::fmt::Write;

use super::{execute, parse_line, ConsoleError, LineBuffer};
use crate::state::ControlState;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Prompt shown before each line
pub const PROMPT: &str = "wavegen> ";

/// Console bound to the shared generator state
///
/// # Example
///
/// ```ignore
/// let mut console = Console::new(&STATE);
/// console.print_banner(&mut out);
/// for byte in uart_bytes {
///     if let Some(Ok(())) = console.process_byte(byte, &mut out) {
///         control.refresh();
///     }
/// }
/// ```
pub struct Console<'a> {
    state: &'a ControlState,
    line: LineBuffer,
    escape_state: EscapeState,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    Normal,
    /// Got ESC
    Escape,
    /// Inside ESC [ ... until the final byte
    Csi,
}

impl<'a> Console<'a> {
    /// Create console
    pub const fn new(state: &'a ControlState) -> Self {
        Self {
            state,
            line: LineBuffer::new(),
            escape_state: EscapeState::Normal,
        }
    }

    /// Process a single input byte
    ///
    /// Returns `Some(result)` when a non-empty line was executed, `None`
    /// while more input is needed. Cursor keys and other escape sequences
    /// are swallowed.
    pub fn process_byte(&mut self, byte: u8, out: &mut dyn Write) -> Option<Result<(), ConsoleError>> {
        match self.escape_state {
            EscapeState::Normal => self.process_normal(byte, out),
            EscapeState::Escape => {
                self.escape_state = if byte == b'[' {
                    EscapeState::Csi
                } else {
                    EscapeState::Normal
                };
                None
            }
            EscapeState::Csi => {
                if (0x40..=0x7E).contains(&byte) {
                    self.escape_state = EscapeState::Normal;
                }
                None
            }
        }
    }

    /// Feed a whole line (without terminator) and execute it
    pub fn process_line(&mut self, line: &str, out: &mut dyn Write) -> Option<Result<(), ConsoleError>> {
        for b in line.bytes() {
            self.process_byte(b, out);
        }
        self.process_byte(b'\r', out)
    }

    fn process_normal(&mut self, byte: u8, out: &mut dyn Write) -> Option<Result<(), ConsoleError>> {
        match byte {
            // Enter
            b'\r' | b'\n' => {
                let _ = writeln!(out);
                if self.line.is_empty() {
                    self.print_prompt(out);
                    return None;
                }

                let result = execute(&parse_line(self.line.as_str()), self.state, out);
                if let Err(e) = result {
                    let _ = writeln!(out, "{}", e);
                }
                self.line.clear();
                self.print_prompt(out);
                Some(result)
            }

            // Backspace
            0x7F | 0x08 => {
                if self.line.backspace() {
                    let _ = write!(out, "\x08 \x08");
                }
                None
            }

            // Escape
            0x1B => {
                self.escape_state = EscapeState::Escape;
                None
            }

            // Ctrl+C
            0x03 => {
                let _ = writeln!(out, "^C");
                self.line.clear();
                self.print_prompt(out);
                None
            }

            // Ctrl+U
            0x15 => {
                for _ in 0..self.line.len() {
                    let _ = write!(out, "\x08 \x08");
                }
                self.line.clear();
                None
            }

            0x20..=0x7E => {
                if self.line.push(byte) {
                    let _ = write!(out, "{}", byte as char);
                }
                None
            }

            _ => None,
        }
    }

    /// Current (unsubmitted) input
    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    /// Print the prompt
    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "{}", PROMPT);
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = writeln!(out, "\r\n{}", VERSION);
        let _ = writeln!(out, "Type 'help' for commands.\r");
        self.print_prompt(out);
    }
}
