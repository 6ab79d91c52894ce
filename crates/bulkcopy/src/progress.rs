//! Progress reporting and cooperative abort.
//!
//! The engine owns one [`RowsCopied`] per invocation, increments it as rows
//! are appended, and hands it to the caller's callback at notify boundaries.
//! The callback may read the count and set [`RowsCopied::abort`]; it must not
//! assume the count maps to committed transactions.

use serde::Serialize;

/// Running progress of one bulk copy invocation.
///
/// Returned as the invocation's result value whether the source ran to
/// completion, the callback aborted, or the executor signalled a stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowsCopied {
    /// Rows handed to the target so far.
    pub rows_copied: u64,

    /// Cooperative stop flag. Set by the progress callback; once set, the
    /// engine pulls no further records and returns this value.
    pub abort: bool,
}

impl RowsCopied {
    /// Create a zeroed progress value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop. Intended for use inside the callback.
    pub fn request_abort(&mut self) {
        self.abort = true;
    }
}

/// Caller-supplied progress observer, invoked at notify boundaries.
pub type ProgressCallback = Box<dyn FnMut(&mut RowsCopied) + Send>;
