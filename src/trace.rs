//! Evaluation trace for step-by-step inspection of a run.
//!
//! When the `trace` feature is enabled, adapter and engine events are written
//! to a `TraceWriter`. The output is a series of tagged lines:
//! ```text
//! TRACE EVAL n=<k> mode=<mode> f=<val> inside=<bool>
//! TRACE BEST n=<k> f=<val>
//! TRACE BOX depth=<d> fmin=<val> width=<w>
//! TRACE LOCAL status=<status> f=<val> iters=<n>
//! ```

use std::fmt::Write as FmtWrite;
use std::sync::Mutex;

/// A thread-safe buffer that collects trace lines.
pub struct TraceWriter {
    buffer: Mutex<String>,
}

impl TraceWriter {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(String::with_capacity(16 * 1024)),
        }
    }

    /// Write a formatted trace line using format args.
    pub fn write_fmt(&self, args: std::fmt::Arguments<'_>) {
        let mut buf = self.lock();
        let _ = buf.write_fmt(args);
        buf.push('\n');
    }

    /// Get all collected trace output.
    pub fn output(&self) -> String {
        self.lock().clone()
    }

    /// Lines carrying the given tag, e.g. `"EVAL"`.
    pub fn lines_tagged(&self, tag: &str) -> Vec<String> {
        let prefix = format!("TRACE {} ", tag);
        self.lock()
            .lines()
            .filter(|l| l.starts_with(&prefix))
            .map(|s| s.to_string())
            .collect()
    }

    // A poisoned buffer still holds every line written before the panic.
    fn lock(&self) -> std::sync::MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TraceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TraceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceWriter")
            .field("bytes", &self.lock().len())
            .finish()
    }
}

/// Macro for conditional trace output (only active with `trace` feature).
#[cfg(feature = "trace")]
#[macro_export]
macro_rules! trace_write {
    ($tracer:expr, $($arg:tt)*) => {
        if let Some(ref tw) = $tracer {
            tw.write_fmt(format_args!($($arg)*));
        }
    };
}

/// No-op when trace feature is disabled.
#[cfg(not(feature = "trace"))]
#[macro_export]
macro_rules! trace_write {
    ($tracer:expr, $($arg:tt)*) => {};
}
