//! Command handlers
//!
//! Parameter commands go through `control::apply`, the same path the keypad
//! uses, so the console can never reach a state the keypad could not.

use core::fmt::Write;
use core::num::{IntErrorKind, ParseIntError};

use super::parser::ParsedCommand;
use super::ConsoleError;
use crate::config::{SQUARE_HIGH, SQUARE_PERIOD, TICK_RATE_HZ};
use crate::control::{apply, Action};
use crate::log_globals::{BG_LOG_STREAM, RT_LOG_STREAM};
use crate::params::{DutyStep, FrequencyIndex, Params, Shape};
use crate::state::ControlState;

/// Handler signature
pub type Handler =
    fn(&ParsedCommand<'_>, &ControlState, &mut dyn Write) -> Result<(), ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub usage: &'static str,
    pub brief: &'static str,
    pub handler: Handler,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", usage: "help [cmd]", brief: "List commands", handler: cmd_help },
    CommandDescriptor { name: "status", usage: "status", brief: "Show shape, frequency and duty", handler: cmd_status },
    CommandDescriptor { name: "shape", usage: "shape <sine|square|triangle|sawtooth>", brief: "Select waveform", handler: cmd_shape },
    CommandDescriptor { name: "freq", usage: "freq <1-5>", brief: "Select frequency (x100 Hz)", handler: cmd_freq },
    CommandDescriptor { name: "duty", usage: "duty <up|down|reset>", brief: "Adjust square duty", handler: cmd_duty },
    CommandDescriptor { name: "reset", usage: "reset", brief: "Square, 100 Hz, 50%", handler: cmd_reset },
    CommandDescriptor { name: "stats", usage: "stats", brief: "Tick and log statistics", handler: cmd_stats },
];

/// Execute a parsed command against the shared state
pub fn execute(
    cmd: &ParsedCommand<'_>,
    state: &ControlState,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if cmd.is_empty() {
        return Ok(());
    }

    let descriptor = find(cmd.command).ok_or(ConsoleError::UnknownCommand)?;
    (descriptor.handler)(cmd, state, out)
}

fn find(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

fn write_params(out: &mut dyn Write, params: &Params) {
    let _ = writeln!(out, "shape: {} ({})", params.shape.name(), params.shape.label());
    let _ = writeln!(out, "freq:  {} Hz ({})", params.frequency.hz(), params.frequency.get());
    let _ = writeln!(
        out,
        "duty:  {}% ({}/{})",
        params.duty.percent(),
        params.duty.threshold(),
        SQUARE_PERIOD
    );
}

// --- Command Implementations ---

fn cmd_help(cmd: &ParsedCommand<'_>, _state: &ControlState, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if let Some(name) = cmd.arg(0) {
        let c = find(name).ok_or(ConsoleError::UnknownCommand)?;
        let _ = writeln!(out, "{}: {}", c.usage, c.brief);
    } else {
        for c in COMMANDS {
            let _ = writeln!(out, "  {:<8} {}", c.name, c.brief);
        }
    }
    Ok(())
}

fn cmd_status(_cmd: &ParsedCommand<'_>, state: &ControlState, out: &mut dyn Write) -> Result<(), ConsoleError> {
    write_params(out, &state.params());
    Ok(())
}

fn cmd_shape(cmd: &ParsedCommand<'_>, state: &ControlState, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let name = cmd.arg(0).ok_or(ConsoleError::MissingArg)?;
    let shape = Shape::from_name(name).ok_or(ConsoleError::InvalidValue)?;

    let params = apply(state, Action::SetShape(shape))?;
    let _ = writeln!(out, "shape={}", params.shape.name());
    Ok(())
}

fn cmd_freq(cmd: &ParsedCommand<'_>, state: &ControlState, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let value = cmd.arg(0).ok_or(ConsoleError::MissingArg)?;
    let n: u32 = value.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow => ConsoleError::OutOfRange,
        _ => ConsoleError::InvalidValue,
    })?;
    let frequency = u8::try_from(n)
        .ok()
        .and_then(FrequencyIndex::new)
        .ok_or(ConsoleError::OutOfRange)?;

    let params = apply(state, Action::SetFrequency(frequency))?;
    let _ = writeln!(out, "freq={} Hz", params.frequency.hz());
    Ok(())
}

fn cmd_duty(cmd: &ParsedCommand<'_>, state: &ControlState, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let action = match cmd.arg(0) {
        None => return Err(ConsoleError::MissingArg),
        Some("up") | Some("+") => Action::AdjustDuty(DutyStep::Up),
        Some("down") | Some("-") => Action::AdjustDuty(DutyStep::Down),
        Some("reset") => Action::ResetDuty,
        Some(_) => return Err(ConsoleError::InvalidValue),
    };

    let params = apply(state, action)?;
    let _ = writeln!(out, "duty={}%", params.duty.percent());
    Ok(())
}

fn cmd_reset(_cmd: &ParsedCommand<'_>, state: &ControlState, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let params = apply(state, Action::ResetAll)?;
    write_params(out, &params);
    Ok(())
}

fn cmd_stats(_cmd: &ParsedCommand<'_>, state: &ControlState, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let (highs, duty) = state.with_square(|table, duty| {
        let highs = table.as_slice().iter().filter(|&&l| l == SQUARE_HIGH).count();
        (highs, duty)
    });

    let _ = writeln!(out, "tick: {} Hz", TICK_RATE_HZ);
    let _ = writeln!(out, "square table: {} high / {} (duty {})", highs, SQUARE_PERIOD, duty.threshold());
    let _ = writeln!(
        out,
        "log rt: {} pending, {} dropped",
        RT_LOG_STREAM.pending(),
        RT_LOG_STREAM.dropped()
    );
    let _ = writeln!(
        out,
        "log bg: {} pending, {} dropped",
        BG_LOG_STREAM.pending(),
        BG_LOG_STREAM.dropped()
    );
    Ok(())
}
