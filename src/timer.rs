//! Tick timer abstraction
//!
//! The dispatcher has exactly one entry point, the tick. Whatever raises
//! the tick (hardware timer, host thread, test) is seen through
//! `TickTimer`: a pending-event flag that the dispatcher clears exactly
//! once per invocation.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Pending-event view of a periodic timer
pub trait TickTimer {
    /// True if the timer's update event is pending
    fn event_pending(&self) -> bool;

    /// Acknowledge the event
    fn clear_event(&mut self);
}

/// Interrupt-raised tick latch
///
/// The interrupt handler calls [`raise`](Self::raise); the task running the
/// dispatcher sees `event_pending` and clears it.
pub struct TickLatch {
    pending: AtomicBool,
    /// Total clears since creation (one per dispatcher invocation)
    clears: AtomicU32,
}

impl TickLatch {
    /// Create latch with no event pending
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            clears: AtomicU32::new(0),
        }
    }

    /// Mark the event pending (ISR side)
    #[inline]
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Number of times the event was cleared
    #[inline]
    pub fn clears(&self) -> u32 {
        self.clears.load(Ordering::Relaxed)
    }
}

impl Default for TickLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl TickTimer for TickLatch {
    #[inline]
    fn event_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    fn clear_event(&mut self) {
        self.pending.store(false, Ordering::Release);
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}

impl TickTimer for &TickLatch {
    #[inline]
    fn event_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    fn clear_event(&mut self) {
        self.pending.store(false, Ordering::Release);
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}

// Shared between ISR and task
unsafe impl Sync for TickLatch {}
