//! Global log stream instances.
//!
//! One stream per execution context, a single drain for both.

use crate::logging::LogStream;

/// Tick context stream.
///
/// The sample dispatcher itself never logs; the firmware RT task uses this
/// stream for its start-up and shutdown messages only.
pub static RT_LOG_STREAM: LogStream = LogStream::new();

/// Foreground stream: control loop, console, initialization.
pub static BG_LOG_STREAM: LogStream = LogStream::new();
