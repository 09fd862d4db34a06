//! Command line parser
//!
//! Whitespace split: one command word and up to `MAX_ARGS` arguments.
//! Anything past that is counted but not kept.

/// Arguments kept per command line
pub const MAX_ARGS: usize = 2;

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// First token, empty for a blank line
    pub command: &'a str,
    pub args: [Option<&'a str>; MAX_ARGS],
    /// Tokens after the command that did not fit in `args`
    pub extra: usize,
}

impl<'a> ParsedCommand<'a> {
    /// Blank line
    pub const fn empty() -> Self {
        Self {
            command: "",
            args: [None; MAX_ARGS],
            extra: 0,
        }
    }

    /// Argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// Number of arguments given, including the ones dropped
    pub fn arg_count(&self) -> usize {
        self.args.iter().filter(|a| a.is_some()).count() + self.extra
    }

    /// True for a blank line
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

impl Default for ParsedCommand<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Split a line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut parts = line.split_whitespace();
    let mut cmd = ParsedCommand::empty();

    let Some(command) = parts.next() else {
        return cmd;
    };
    cmd.command = command;

    for (i, arg) in parts.enumerate() {
        match cmd.args.get_mut(i) {
            Some(slot) => *slot = Some(arg),
            None => cmd.extra += 1,
        }
    }
    cmd
}
