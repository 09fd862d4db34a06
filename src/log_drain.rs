//! Log drain: formats queued entries and writes them to a blocking output.
//!
//! Runs in the foreground only (host stdout, firmware console UART).
//!
//! Output format: `[timestamp_us] LEVEL: message`

use core::fmt::Write;

use crate::log_globals::{BG_LOG_STREAM, RT_LOG_STREAM};
use crate::logging::{LogEntry, LogStream};

/// Write one entry as a line.
pub fn write_entry(out: &mut dyn Write, entry: &LogEntry) -> core::fmt::Result {
    writeln!(
        out,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    )
}

/// Drain one stream completely.
///
/// Returns the number of entries written. Stops early if the output fails;
/// the entry that failed is lost.
pub fn drain_stream<const N: usize>(stream: &LogStream<N>, out: &mut dyn Write) -> usize {
    let mut count = 0;
    while let Some(entry) = stream.drain() {
        if write_entry(out, &entry).is_err() {
            break;
        }
        count += 1;
    }
    count
}

/// Write a warning line if either counter is non-zero.
pub fn report_dropped(out: &mut dyn Write, rt_dropped: u32, bg_dropped: u32) -> core::fmt::Result {
    if rt_dropped == 0 && bg_dropped == 0 {
        return Ok(());
    }
    writeln!(out, "[WARN] Dropped: RT={}, BG={}", rt_dropped, bg_dropped)
}

/// Drain both global streams, RT first, then report drops.
///
/// Returns the number of entries written.
pub fn drain_all(out: &mut dyn Write) -> usize {
    let count = drain_stream(&RT_LOG_STREAM, out) + drain_stream(&BG_LOG_STREAM, out);
    let _ = report_dropped(out, RT_LOG_STREAM.take_dropped(), BG_LOG_STREAM.take_dropped());
    count
}
