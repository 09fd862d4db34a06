//! RustWavegen - Main entry point
//!
//! - ESP-IDF: firmware (`firmware.rs`): DAC, LCD, keypad, tick timer
//! - Host: simulator. Replays a key sequence through the real control
//!   loop and dispatcher, prints the LCD and a summary of the samples.
//!
//! Host usage:
//!
//! ```text
//! wavegen [KEYS] [--ticks N] [--dump] [--console]
//!
//!   KEYS       keypad sequence, e.g. "###6" (default)
//!   --ticks N  ticks to run after each key (default 392)
//!   --dump     print every DAC code
//!   --console  read console commands from stdin instead
//! ```

#[cfg(target_os = "espidf")]
mod firmware;

use rust_wavegen::ControlState;

/// The one generator state, shared by the tick and the foreground.
static STATE: ControlState = ControlState::new();

#[cfg(target_os = "espidf")]
fn main() {
    firmware::run(&STATE)
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    host::run(&STATE)
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::BufRead;
    use std::time::{Duration, Instant};

    use embedded_hal::delay::DelayNs;
    use rust_wavegen::console::Console;
    use rust_wavegen::{
        log_drain, CaptureSink, CharLcd, ControlLoop, ControlState, DacCalibration, KeyScript,
        SampleDispatcher, TickLatch, TickOutcome,
    };

    const DEFAULT_KEYS: &str = "###6";
    const DEFAULT_TICKS: usize = 392;
    const CAPTURE: usize = 4096;

    /// Thread-sleep delay
    struct StdDelay;

    impl DelayNs for StdDelay {
        fn delay_ns(&mut self, ns: u32) {
            std::thread::sleep(Duration::from_nanos(ns.into()));
        }
    }

    struct Options {
        keys: String,
        ticks: usize,
        dump: bool,
        console: bool,
    }

    fn parse_args() -> Result<Options, String> {
        let mut opts = Options {
            keys: DEFAULT_KEYS.to_string(),
            ticks: DEFAULT_TICKS,
            dump: false,
            console: false,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ticks" => {
                    let n = args.next().ok_or("--ticks needs a value")?;
                    opts.ticks = n.parse().map_err(|_| format!("bad tick count '{}'", n))?;
                }
                "--dump" => opts.dump = true,
                "--console" => opts.console = true,
                "-h" | "--help" => return Err("usage: wavegen [KEYS] [--ticks N] [--dump] [--console]".into()),
                _ if arg.starts_with('-') => return Err(format!("unknown option '{}'", arg)),
                _ => opts.keys = arg,
            }
        }
        opts.ticks = opts.ticks.min(CAPTURE);
        Ok(opts)
    }

    pub fn run(state: &'static ControlState) {
        let opts = match parse_args() {
            Ok(o) => o,
            Err(msg) => {
                eprintln!("{}", msg);
                std::process::exit(2);
            }
        };

        let start = Instant::now();
        let now_us = move || start.elapsed().as_micros() as i64;

        let latch = TickLatch::new();
        let mut dispatcher =
            SampleDispatcher::new(state, CaptureSink::<CAPTURE>::new(), DacCalibration::DEFAULT);
        let mut control = ControlLoop::new(state, KeyScript::new(opts.keys.as_bytes()), CharLcd::new(), StdDelay);
        control.start();
        println!("{}", control.display());

        if opts.console {
            run_console(state, &mut control, &mut dispatcher, &latch, &opts, &now_us);
        } else {
            while let Some(event) = control.poll(now_us()) {
                match event.result {
                    Ok(_) => println!("key '{}' accepted", event.key.as_ascii() as char),
                    Err(why) => println!("key '{}' ignored: {}", event.key.as_ascii() as char, why),
                }
                println!("{}", control.display());
                run_ticks(&mut dispatcher, &latch, &opts);
                flush_logs();
            }
        }
        flush_logs();
    }

    fn run_console(
        state: &ControlState,
        control: &mut ControlLoop<'_, KeyScript<'_>, CharLcd, StdDelay>,
        dispatcher: &mut SampleDispatcher<'_, CaptureSink<CAPTURE>>,
        latch: &TickLatch,
        opts: &Options,
        now_us: &dyn Fn() -> i64,
    ) {
        let mut out = String::new();
        let mut console = Console::new(state);
        console.print_banner(&mut out);
        print!("{}", out);

        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            out.clear();
            let result = console.process_line(&line, &mut out);
            print!("{}", out);

            if let Some(Ok(())) = result {
                control.refresh();
                rust_wavegen::rt_info!(rust_wavegen::BG_LOG_STREAM, now_us(), "console: {}", line.trim());
                println!("\n{}", control.display());
                run_ticks(dispatcher, latch, opts);
            }
            flush_logs();
        }
        println!();
    }

    fn run_ticks(
        dispatcher: &mut SampleDispatcher<'_, CaptureSink<CAPTURE>>,
        latch: &TickLatch,
        opts: &Options,
    ) {
        dispatcher.sink_mut().clear();
        let mut dropped = 0;
        for _ in 0..opts.ticks {
            latch.raise();
            let mut timer = latch;
            if dispatcher.on_tick(&mut timer) == TickOutcome::Dropped {
                dropped += 1;
            }
        }

        let codes = dispatcher.sink().codes();
        let min = codes.iter().map(|c| c.get()).min().unwrap_or(0);
        let max = codes.iter().map(|c| c.get()).max().unwrap_or(0);
        println!(
            "{} ticks: {} sent, {} dropped, code {}..={}",
            opts.ticks,
            codes.len(),
            dropped,
            min,
            max
        );
        if opts.dump {
            for c in codes {
                println!("{}", c.get());
            }
        }
    }

    fn flush_logs() {
        let mut out = String::new();
        log_drain::drain_all(&mut out);
        print!("{}", out);
    }
}
