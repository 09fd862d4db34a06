//! RT-safe logging for RustWavegen.
//!
//! # Architecture
//!
//! ```text
//! Control loop / console     LogStream          Log drain
//! ──────────────────────     ─────────          ─────────
//!
//! rt_info!() ─────────────▶ [L0][L1][L2] ─────▶ stdout / UART
//! formats on the stack       lock-free ring     blocking ok
//! never blocks               drops when full
//! ```
//!
//! # Rules
//!
//! - The sample dispatcher does not log at all
//! - Everything else logs through the `rt_*!` macros, never `println!`
//! - A full ring drops the message and counts it

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length (longer messages are cut).
pub const MAX_MSG_LEN: usize = 96;

/// Entries per stream.
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Upper-case name used in drained output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds since boot.
    pub timestamp_us: i64,
    pub level: LogLevel,
    /// Valid bytes in `msg`.
    pub len: u8,
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    /// Empty entry.
    pub const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. A cut multi-byte character is dropped.
    pub fn message(&self) -> &str {
        let bytes = &self.msg[..self.len as usize];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One ring slot. `seq` is the write position + 1 once the entry is
/// published, so a reserved but unwritten slot is never drained.
struct Slot {
    seq: AtomicU32,
    entry: UnsafeCell<LogEntry>,
}

impl Slot {
    const EMPTY: Self = Self {
        seq: AtomicU32::new(0),
        entry: UnsafeCell::new(LogEntry::EMPTY),
    };
}

/// Lock-free log ring: many producers, one drain.
///
/// - Producers reserve a position with a CAS on the write index
/// - `push` never blocks; a full ring drops and counts
/// - The drain runs wherever blocking output is allowed
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: [Slot; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: a producer owns the slot it reserved until it publishes `seq`;
// the single drain only touches slots whose `seq` says published.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Empty stream. `N` must be a power of two.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            slots: [const { Slot::EMPTY }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a message.
    ///
    /// Returns `false` if the ring was full and the message was dropped.
    ///
    /// # Timing
    ///
    /// O(1) apart from CAS retries under contention; copies at most
    /// `MAX_MSG_LEN` bytes.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut write = self.write_idx.load(Ordering::Relaxed);
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        let slot = &self.slots[(write as usize) & Self::MASK];
        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: position `write` is reserved by this producer alone and
        // the drain has already released the slot (capacity check above).
        unsafe {
            let entry = &mut *slot.entry.get();
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }
        slot.seq.store(write.wrapping_add(1), Ordering::Release);

        true
    }

    /// Take the oldest entry, `None` when empty or not yet published.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let slot = &self.slots[(read as usize) & Self::MASK];

        if slot.seq.load(Ordering::Acquire) != read.wrapping_add(1) {
            return None;
        }

        // SAFETY: single drain; `seq` shows the producer finished writing
        let entry = unsafe { *slot.entry.get() };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Messages dropped since the last reset.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Read and zero the dropped counter.
    #[inline]
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// True if the drain has work.
    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Positions reserved but not yet drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format into a byte buffer, cutting at the end of the buffer.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `fmt::Write` over a fixed byte slice. Excess output is discarded.
struct BufWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl core::fmt::Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let to_write = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Log to a stream without blocking.
///
/// # Example
///
/// ```ignore
/// rt_log!(LogLevel::Info, BG_LOG_STREAM, now_us, "shape {}", shape.label());
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

/// Info log.
#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

/// Warning log.
#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

/// Error log.
#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

/// Debug log.
#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

/// Trace log.
#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $timestamp, $($arg)*)
    };
}
