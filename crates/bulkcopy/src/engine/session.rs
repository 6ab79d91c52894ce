//! The adaptive batching loop, as a suspension-free state machine.
//!
//! [`BatchSession`] owns the builder, the active strategy, and the running
//! progress for one invocation. Pushing a row yields a decision: keep
//! buffering, or flush now (optionally re-appending the row that tipped a
//! hard limit). The sync and async drivers are thin loops around this type;
//! they own only the pull and execute effects, so both paths share the exact
//! same batching behavior.
//!
//! Limit handling after every append:
//!
//! - Over a hard limit with more than one buffered row: the last row is
//!   rolled back, the remainder flushes, and the row is re-appended into the
//!   next batch. No record is ever dropped.
//! - Over a hard limit with a single buffered row: the row flushes alone,
//!   oversized, left to the database engine to accept or reject.

use crate::core::value::SqlValue;
use crate::error::Result;
use crate::progress::RowsCopied;

use super::builder::BatchBuilder;
use super::strategy::RowStrategy;

/// Decision returned by [`BatchSession::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    /// The row joined the open batch; keep pulling records.
    Buffered,
    /// The open batch is finished and must be executed. When `readd` is
    /// set, the pushed row was rolled back out of it and must be
    /// re-appended after the reset.
    Flush { readd: bool },
}

pub(crate) struct BatchSession<'a> {
    builder: BatchBuilder<'a>,
    strategy: &'static dyn RowStrategy,
    effective_batch_size: usize,
    max_parameters: usize,
    max_sql_length: usize,
    progress: RowsCopied,
}

impl<'a> BatchSession<'a> {
    /// Open a session: emits the statement header for the first batch.
    pub(crate) fn new(
        mut builder: BatchBuilder<'a>,
        strategy: &'static dyn RowStrategy,
        effective_batch_size: usize,
    ) -> Self {
        let max_parameters = builder.dialect().max_parameters();
        let max_sql_length = builder.dialect().max_sql_length();
        strategy.prepare(&mut builder);
        Self {
            builder,
            strategy,
            effective_batch_size,
            max_parameters,
            max_sql_length,
            progress: RowsCopied::new(),
        }
    }

    /// Append one row and decide whether the batch must flush.
    pub(crate) fn push(&mut self, row: &[SqlValue<'_>]) -> Result<PushOutcome> {
        self.builder.mark_row();
        self.strategy.add(&mut self.builder, row)?;
        self.progress.rows_copied += 1;

        let over_limit = self.builder.param_count() > self.max_parameters
            || self.builder.sql_len() > self.max_sql_length;

        if self.builder.row_count() >= self.effective_batch_size || over_limit {
            // A lone row over the limit is sent as-is; otherwise the
            // offender backs out and rides the next batch.
            let readd = over_limit && self.builder.row_count() > 1;
            if readd {
                self.builder.rollback_row();
                self.progress.rows_copied -= 1;
            }
            self.strategy.finish(&mut self.builder);
            return Ok(PushOutcome::Flush { readd });
        }

        Ok(PushOutcome::Buffered)
    }

    /// Re-append a row rolled back by the previous flush into the fresh
    /// batch. Limit checks do not re-run here; the row is evaluated
    /// together with the next pushed record.
    pub(crate) fn readd(&mut self, row: &[SqlValue<'_>]) -> Result<()> {
        self.builder.mark_row();
        self.strategy.add(&mut self.builder, row)?;
        self.progress.rows_copied += 1;
        Ok(())
    }

    /// Restore the header-only state for the next physical batch.
    pub(crate) fn reset(&mut self) {
        self.builder.reset();
    }

    /// Close the final partial batch, if any rows are buffered.
    /// Returns whether there is a statement to execute.
    pub(crate) fn finish_trailing(&mut self) -> bool {
        if self.builder.row_count() == 0 {
            return false;
        }
        self.strategy.finish(&mut self.builder);
        true
    }

    // ===== Accessors for the drivers =====

    pub(crate) fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub(crate) fn params(&self) -> &[SqlValue<'static>] {
        self.builder.params()
    }

    pub(crate) fn row_count(&self) -> usize {
        self.builder.row_count()
    }

    pub(crate) fn param_count(&self) -> usize {
        self.builder.param_count()
    }

    pub(crate) fn sql_len(&self) -> usize {
        self.builder.sql_len()
    }

    pub(crate) fn progress(&self) -> &RowsCopied {
        &self.progress
    }

    pub(crate) fn progress_mut(&mut self) -> &mut RowsCopied {
        &mut self.progress
    }

    /// Rows belonging to batches that already executed; excludes the open
    /// (or failing) batch.
    pub(crate) fn flushed_rows(&self) -> u64 {
        self.progress.rows_copied - self.builder.row_count() as u64
    }

    /// Progress as seen by a caller when the open batch is discarded
    /// (cooperative cancellation).
    pub(crate) fn flushed_progress(&self) -> RowsCopied {
        RowsCopied {
            rows_copied: self.flushed_rows(),
            ..self.progress
        }
    }
}
