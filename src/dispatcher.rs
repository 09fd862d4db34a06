//! Module: dispatcher
//!
//! Purpose: Periodic sample dispatcher. Runs once per tick, reads the
//! active table under a private cursor and offers the sample to the sink.
//!
//! Architecture:
//! ```text
//! TickTimer ──▶ on_tick ──▶ ControlState::fetch ──▶ calibration ──▶ SampleSink
//!                  │              (shape, step)
//!                  └── clear_event (exactly once)
//! ```
//!
//! # Rules
//!
//! - The tick is the only entry point
//! - Never blocks, never allocates, never logs, never panics
//! - Sink busy: the sample is dropped, no retry, no queue
//! - Cursor is wrapped before use, so a shape switch that shrinks the
//!   period cannot produce an out-of-range read
//!
//! Safety: RT-safe. One short critical section per tick.

use crate::config::DacCalibration;
use crate::sink::{DacCode, SampleSink};
use crate::state::ControlState;
use crate::timer::TickTimer;

/// Playback position in the active table
///
/// Advanced by the frequency step every tick and wrapped to 0 lazily, on
/// the next read, when it reaches the active period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackCursor {
    index: usize,
}

impl PlaybackCursor {
    /// Cursor at index 0
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Index to read for a table of `period` samples
    ///
    /// Wraps to 0 if the cursor is at or past `period`. Otherwise the
    /// current position is kept, even across a shape switch.
    #[inline]
    pub fn claim(&mut self, period: usize) -> usize {
        if self.index >= period {
            self.index = 0;
        }
        self.index
    }

    /// Move forward by `step` samples
    #[inline]
    pub fn advance(&mut self, step: usize) {
        self.index = self.index.wrapping_add(step);
    }

    /// Raw position (may be past the period until the next claim)
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Result of one dispatcher invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Sample accepted by the sink
    Sent(DacCode),
    /// Sink busy, sample dropped
    Dropped,
    /// Invoked without a pending timer event; nothing dispatched
    Spurious,
}

/// Timer-driven sample dispatcher
///
/// # Example
///
/// ```ignore
/// static STATE: ControlState = ControlState::new();
///
/// let mut dispatcher = SampleDispatcher::new(&STATE, dac, DacCalibration::DEFAULT);
///
/// // Tick context:
/// loop {
///     wait_for_tick();
///     dispatcher.on_tick(&mut latch);
/// }
/// ```
pub struct SampleDispatcher<'a, S: SampleSink> {
    state: &'a ControlState,
    sink: S,
    calibration: DacCalibration,
    cursor: PlaybackCursor,
}

impl<'a, S: SampleSink> SampleDispatcher<'a, S> {
    /// Create a dispatcher starting at index 0
    pub fn new(state: &'a ControlState, sink: S, calibration: DacCalibration) -> Self {
        Self {
            state,
            sink,
            calibration,
            cursor: PlaybackCursor::new(),
        }
    }

    /// Handle one timer event
    ///
    /// Dispatches a sample if the event is pending, then clears the event.
    /// The clear happens on every call, dispatched or not.
    ///
    /// # Timing
    ///
    /// O(1): one critical section, one sink call.
    #[inline]
    pub fn on_tick<T: TickTimer>(&mut self, timer: &mut T) -> TickOutcome {
        let outcome = if timer.event_pending() {
            self.dispatch()
        } else {
            TickOutcome::Spurious
        };
        timer.clear_event();
        outcome
    }

    #[inline]
    fn dispatch(&mut self) -> TickOutcome {
        let (level, step) = self.state.fetch(&mut self.cursor);
        let code = self.calibration.to_code(level);

        let outcome = if self.sink.try_send(code) {
            TickOutcome::Sent(code)
        } else {
            TickOutcome::Dropped
        };

        self.cursor.advance(step);
        outcome
    }

    /// Borrow the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Borrow the sink mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
