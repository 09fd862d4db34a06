//! Console byte-stream tests: line editing and dispatch

use rust_wavegen::console::{Console, ConsoleError, PROMPT};
use rust_wavegen::{ControlState, Shape};

fn feed(console: &mut Console<'_>, bytes: &[u8], out: &mut String) -> Vec<Result<(), ConsoleError>> {
    bytes
        .iter()
        .filter_map(|&b| console.process_byte(b, out))
        .collect()
}

#[test]
fn test_enter_executes_line() {
    let state = ControlState::new();
    let mut console = Console::new(&state);
    let mut out = String::new();

    let results = feed(&mut console, b"shape sine\r", &mut out);
    assert_eq!(results, vec![Ok(())]);
    assert_eq!(state.params().shape, Shape::Sine);
    assert!(out.starts_with("shape sine"));
    assert!(out.ends_with(PROMPT));
}

#[test]
fn test_errors_are_printed() {
    let state = ControlState::new();
    let mut console = Console::new(&state);
    let mut out = String::new();

    let results = feed(&mut console, b"freq 9\n", &mut out);
    assert_eq!(results, vec![Err(ConsoleError::OutOfRange)]);
    assert!(out.contains("E04: out of range"));
}

#[test]
fn test_blank_line_only_reprompts() {
    let state = ControlState::new();
    let mut console = Console::new(&state);
    let mut out = String::new();

    assert!(feed(&mut console, b"\r\r", &mut out).is_empty());
    assert_eq!(out.matches(PROMPT).count(), 2);
}

#[test]
fn test_backspace_edits_line() {
    let state = ControlState::new();
    let mut console = Console::new(&state);
    let mut out = String::new();

    feed(&mut console, b"freq 44\x7F", &mut out);
    assert_eq!(console.line(), "freq 4");
    assert!(out.ends_with("\x08 \x08"));

    feed(&mut console, b"\r", &mut out);
    assert_eq!(state.params().frequency.hz(), 400);
}

#[test]
fn test_ctrl_c_and_ctrl_u_discard_input() {
    let state = ControlState::new();
    let mut console = Console::new(&state);
    let mut out = String::new();

    feed(&mut console, b"shape saw\x03", &mut out);
    assert_eq!(console.line(), "");
    assert!(out.contains("^C"));

    feed(&mut console, b"reset\x15", &mut out);
    assert_eq!(console.line(), "");
    assert_eq!(state.params().shape, Shape::Square);
}

#[test]
fn test_escape_sequences_swallowed() {
    let state = ControlState::new();
    let mut console = Console::new(&state);
    let mut out = String::new();

    // Up arrow, then F5 (ESC [ 1 5 ~)
    feed(&mut console, b"\x1b[A\x1b[15~freq 2", &mut out);
    assert_eq!(console.line(), "freq 2");
}

#[test]
fn test_process_line() {
    let state = ControlState::new();
    let mut console = Console::new(&state);
    let mut out = String::new();

    assert_eq!(console.process_line("duty down", &mut out), Some(Ok(())));
    assert_eq!(state.params().duty.percent(), 40);
}

#[test]
fn test_banner_shows_version() {
    let state = ControlState::new();
    let console = Console::new(&state);
    let mut out = String::new();
    console.print_banner(&mut out);

    assert!(out.contains("RustWavegen v"));
    assert!(out.ends_with(PROMPT));
}
