//! The bulk copy engine.
//!
//! [`BulkCopy`] performs entry validation once (name override resolution,
//! identifier checks, identity filtering, effective batch size), then drives
//! one of two paths:
//!
//! - `copy` / `copy_async`: the adaptive multi-row batching loop. Rows are
//!   appended to a growing statement until the effective batch size or a
//!   hard engine limit is reached, then the statement executes and the
//!   buffer resets for the next batch.
//! - `copy_row_by_row` / `copy_row_by_row_async`: one single-row insert per
//!   record through a caller-supplied sink.
//!
//! Both paths report progress through the same callback contract and return
//! the final [`RowsCopied`] whether the source ran out, the callback
//! aborted, the executor stopped, or cancellation was requested.

mod builder;
mod row_by_row;
mod session;
mod strategy;

use std::pin::pin;
use std::time::Instant;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::core::schema::{validate_identifier, ColumnMeta, TableRef};
use crate::core::traits::{
    AsyncBatchExecutor, AsyncRowSink, BatchExecutor, Dialect, Executed, RowSink, ToRow,
};
use crate::error::{BulkCopyError, Result};
use crate::options::{BulkCopyOptions, CopyMethod};
use crate::progress::{ProgressCallback, RowsCopied};

use builder::BatchBuilder;
use session::{BatchSession, PushOutcome};
use strategy::select_strategy;

/// One validated bulk copy target: resolved table, insertable columns, and
/// the effective batch size. Reusable across invocations.
pub struct BulkCopy<D: Dialect> {
    dialect: D,
    target: TableRef,
    table_sql: String,
    columns: Vec<ColumnMeta>,
    /// Indices into `columns` of the columns actually inserted.
    picks: Vec<usize>,
    effective_batch_size: usize,
    options: BulkCopyOptions,
    progress_callback: Option<ProgressCallback>,
}

impl<D: Dialect> std::fmt::Debug for BulkCopy<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkCopy")
            .field("dialect", &self.dialect.name())
            .field("target", &self.target)
            .field("table_sql", &self.table_sql)
            .field("columns", &self.columns)
            .field("picks", &self.picks)
            .field("effective_batch_size", &self.effective_batch_size)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}


impl<D: Dialect> BulkCopy<D> {
    /// Validate a target and fix the invocation parameters.
    ///
    /// Fails fast on incompatible options (identity preservation with
    /// row-by-row copying), invalid identifiers, or a column list with
    /// nothing insertable in it.
    pub fn new(
        target: TableRef,
        columns: Vec<ColumnMeta>,
        dialect: D,
        options: BulkCopyOptions,
    ) -> Result<Self> {
        if options.keep_identity && options.method == CopyMethod::RowByRow {
            return Err(BulkCopyError::config(
                "keep_identity is not supported by row-by-row copy",
            ));
        }

        let target = options.resolve_target(&target);
        target.validate()?;
        for column in &columns {
            validate_identifier(&column.name)?;
        }

        // Identity columns are skipped unless the caller keeps identity
        // values; skip-on-insert columns are always skipped.
        let picks: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.skip_on_insert || (options.keep_identity && c.is_identity))
            .map(|(i, _)| i)
            .collect();
        if picks.is_empty() {
            return Err(BulkCopyError::config(format!(
                "no insertable columns for table {}",
                target.display_name()
            )));
        }

        let batch_size = options.get_batch_size();
        let effective_batch_size = if options.use_parameters {
            let ceiling = options
                .max_parameters_for_batch
                .unwrap_or_else(|| dialect.max_parameters());
            batch_size.min(ceiling / picks.len()).max(1)
        } else {
            batch_size
        };

        let table_sql = dialect.render_table(&target);

        Ok(Self {
            dialect,
            target,
            table_sql,
            columns,
            picks,
            effective_batch_size,
            options,
            progress_callback: None,
        })
    }

    /// Attach a progress callback, invoked per the configured notify
    /// interval.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut RowsCopied) + Send + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// The resolved target this instance writes to.
    pub fn target(&self) -> &TableRef {
        &self.target
    }

    /// Rows per batch after capping by the parameter ceiling.
    pub fn effective_batch_size(&self) -> usize {
        self.effective_batch_size
    }

    /// Copy every record from `source`, blocking.
    ///
    /// Returns the final progress; see [`RowsCopied`]. Rendering and
    /// execution failures propagate as errors carrying the rows already
    /// copied by earlier batches.
    pub fn copy<I, E>(&mut self, source: I, executor: &mut E) -> Result<RowsCopied>
    where
        I: IntoIterator,
        I::Item: ToRow,
        E: BatchExecutor,
    {
        let label = self.target.display_name();
        let strategy = select_strategy(self.dialect.multi_row_shape());
        let builder = BatchBuilder::new(
            &self.dialect,
            self.table_sql.clone(),
            &self.columns,
            &self.picks,
            self.options.use_parameters,
        );
        let mut session = BatchSession::new(builder, strategy, self.effective_batch_size);
        let notify_after = self.options.notify_after;
        let callback = &mut self.progress_callback;
        let mut batches = 0u64;

        debug!(
            "{}: starting multi-row copy (batch size {}, {} values)",
            label,
            self.effective_batch_size,
            if self.options.use_parameters { "bound" } else { "inline" }
        );

        for record in source {
            let row = record.to_row()?;
            match session.push(&row)? {
                PushOutcome::Buffered => {}
                PushOutcome::Flush { readd } => {
                    batches += 1;
                    if let Executed::Stop = execute_batch(executor, &session, &label)? {
                        return Ok(*session.progress());
                    }
                    if notify_progress(session.progress_mut(), notify_after, callback) {
                        return Ok(*session.progress());
                    }
                    session.reset();
                    if readd {
                        session.readd(&row)?;
                    }
                }
            }
        }

        if session.finish_trailing() {
            batches += 1;
            if let Executed::Stop = execute_batch(executor, &session, &label)? {
                return Ok(*session.progress());
            }
            // An abort request after the final batch changes nothing; the
            // source is already exhausted.
            notify_progress(session.progress_mut(), notify_after, callback);
        }

        info!(
            "{}: copied {} rows in {} batches",
            label,
            session.progress().rows_copied,
            batches
        );
        Ok(*session.progress())
    }

    /// Copy every record from `source`, suspending on pulls and executes.
    ///
    /// Cancellation is checked before each pull and each execute; when
    /// triggered, batches already flushed stay executed, the open batch is
    /// discarded, and the progress so far is returned.
    pub async fn copy_async<S, E>(
        &mut self,
        source: S,
        executor: &mut E,
        cancel: &CancellationToken,
    ) -> Result<RowsCopied>
    where
        S: Stream,
        S::Item: ToRow,
        E: AsyncBatchExecutor,
    {
        let label = self.target.display_name();
        let strategy = select_strategy(self.dialect.multi_row_shape());
        let builder = BatchBuilder::new(
            &self.dialect,
            self.table_sql.clone(),
            &self.columns,
            &self.picks,
            self.options.use_parameters,
        );
        let mut session = BatchSession::new(builder, strategy, self.effective_batch_size);
        let notify_after = self.options.notify_after;
        let callback = &mut self.progress_callback;
        let mut source = pin!(source);
        let mut batches = 0u64;

        debug!(
            "{}: starting multi-row copy (batch size {}, {} values)",
            label,
            self.effective_batch_size,
            if self.options.use_parameters { "bound" } else { "inline" }
        );

        loop {
            if cancel.is_cancelled() {
                debug!("{}: copy cancelled before pull", label);
                return Ok(session.flushed_progress());
            }
            let Some(record) = source.next().await else {
                break;
            };
            let row = record.to_row()?;
            match session.push(&row)? {
                PushOutcome::Buffered => {}
                PushOutcome::Flush { readd } => {
                    if cancel.is_cancelled() {
                        debug!("{}: copy cancelled before execute", label);
                        return Ok(session.flushed_progress());
                    }
                    batches += 1;
                    if let Executed::Stop =
                        execute_batch_async(executor, &session, &label).await?
                    {
                        return Ok(*session.progress());
                    }
                    if notify_progress(session.progress_mut(), notify_after, callback) {
                        return Ok(*session.progress());
                    }
                    session.reset();
                    if readd {
                        session.readd(&row)?;
                    }
                }
            }
        }

        if session.finish_trailing() {
            if cancel.is_cancelled() {
                debug!("{}: copy cancelled before final execute", label);
                return Ok(session.flushed_progress());
            }
            batches += 1;
            if let Executed::Stop = execute_batch_async(executor, &session, &label).await? {
                return Ok(*session.progress());
            }
            notify_progress(session.progress_mut(), notify_after, callback);
        }

        info!(
            "{}: copied {} rows in {} batches",
            label,
            session.progress().rows_copied,
            batches
        );
        Ok(*session.progress())
    }

    /// Copy each record through a single-row sink, blocking.
    pub fn copy_row_by_row<I, S>(&mut self, source: I, sink: &mut S) -> Result<RowsCopied>
    where
        I: IntoIterator,
        S: RowSink<I::Item>,
    {
        self.reject_identity_for_row_by_row()?;
        let label = self.target.display_name();
        debug!("{}: starting row-by-row copy", label);
        let progress = row_by_row::copy_sync(
            &self.target,
            source,
            sink,
            self.options.notify_after,
            &mut self.progress_callback,
        )?;
        info!("{}: copied {} rows row-by-row", label, progress.rows_copied);
        Ok(progress)
    }

    /// Copy each record through a single-row sink, suspending.
    pub async fn copy_row_by_row_async<S, K>(
        &mut self,
        source: S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<RowsCopied>
    where
        S: Stream,
        S::Item: Send + Sync,
        K: AsyncRowSink<S::Item>,
    {
        self.reject_identity_for_row_by_row()?;
        let label = self.target.display_name();
        debug!("{}: starting row-by-row copy", label);
        let progress = row_by_row::copy_async(
            &self.target,
            source,
            sink,
            self.options.notify_after,
            &mut self.progress_callback,
            cancel,
        )
        .await?;
        info!("{}: copied {} rows row-by-row", label, progress.rows_copied);
        Ok(progress)
    }

    fn reject_identity_for_row_by_row(&self) -> Result<()> {
        if self.options.keep_identity {
            return Err(BulkCopyError::config(
                "keep_identity is not supported by row-by-row copy",
            ));
        }
        Ok(())
    }
}

/// Invoke the progress callback if the running row count sits on a notify
/// boundary. Returns whether the callback requested an abort.
pub(crate) fn notify_progress(
    progress: &mut RowsCopied,
    notify_after: usize,
    callback: &mut Option<ProgressCallback>,
) -> bool {
    if notify_after == 0 || progress.rows_copied % notify_after as u64 != 0 {
        return false;
    }
    match callback {
        Some(cb) => {
            cb(progress);
            progress.abort
        }
        None => false,
    }
}

fn execute_batch<E: BatchExecutor>(
    executor: &mut E,
    session: &BatchSession<'_>,
    label: &str,
) -> Result<Executed> {
    let rows = session.row_count();
    debug!(
        "{}: executing batch of {} rows ({} bytes, {} parameters)",
        label,
        rows,
        session.sql_len(),
        session.param_count()
    );
    trace!("{}: batch statement: {}", label, session.sql());

    let start = Instant::now();
    match executor.execute(session.sql(), session.params()) {
        Ok(Executed::Written(affected)) => {
            debug!(
                "{}: batch of {} rows executed in {}ms, {} rows affected",
                label,
                rows,
                start.elapsed().as_millis(),
                affected
            );
            Ok(Executed::Written(affected))
        }
        Ok(Executed::Stop) => {
            debug!(
                "{}: executor requested stop after {} rows",
                label,
                session.progress().rows_copied
            );
            Ok(Executed::Stop)
        }
        Err(source) => {
            warn!(
                "{}: batch of {} rows failed after {}ms: {}",
                label,
                rows,
                start.elapsed().as_millis(),
                source
            );
            Err(BulkCopyError::execution(session.flushed_rows(), source))
        }
    }
}

async fn execute_batch_async<E: AsyncBatchExecutor>(
    executor: &mut E,
    session: &BatchSession<'_>,
    label: &str,
) -> Result<Executed> {
    let rows = session.row_count();
    debug!(
        "{}: executing batch of {} rows ({} bytes, {} parameters)",
        label,
        rows,
        session.sql_len(),
        session.param_count()
    );
    trace!("{}: batch statement: {}", label, session.sql());

    let start = Instant::now();
    match executor.execute(session.sql(), session.params()).await {
        Ok(Executed::Written(affected)) => {
            debug!(
                "{}: batch of {} rows executed in {}ms, {} rows affected",
                label,
                rows,
                start.elapsed().as_millis(),
                affected
            );
            Ok(Executed::Written(affected))
        }
        Ok(Executed::Stop) => {
            debug!(
                "{}: executor requested stop after {} rows",
                label,
                session.progress().rows_copied
            );
            Ok(Executed::Stop)
        }
        Err(source) => {
            warn!(
                "{}: batch of {} rows failed after {}ms: {}",
                label,
                rows,
                start.elapsed().as_millis(),
                source
            );
            Err(BulkCopyError::execution(session.flushed_rows(), source))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Dialect for Plain {
        fn name(&self) -> &str {
            "plain"
        }

        fn max_parameters(&self) -> usize {
            10
        }
    }

    fn make_columns() -> Vec<ColumnMeta> {
        vec![
            ColumnMeta::new("id"),
            ColumnMeta::new("name"),
            ColumnMeta::new("qty"),
        ]
    }

    #[test]
    fn test_effective_batch_size_capped_by_parameter_ceiling() {
        let options = BulkCopyOptions::new()
            .with_max_batch_size(100)
            .with_parameters();
        let copy = BulkCopy::new(TableRef::new("t"), make_columns(), Plain, options).unwrap();
        // 10 parameters / 3 columns = 3 rows per batch.
        assert_eq!(copy.effective_batch_size(), 3);
    }

    #[test]
    fn test_effective_batch_size_override_ceiling() {
        let options = BulkCopyOptions::new()
            .with_max_batch_size(100)
            .with_parameters()
            .with_max_parameters_for_batch(6);
        let copy = BulkCopy::new(TableRef::new("t"), make_columns(), Plain, options).unwrap();
        assert_eq!(copy.effective_batch_size(), 2);
    }

    #[test]
    fn test_effective_batch_size_uncapped_without_parameters() {
        let options = BulkCopyOptions::new().with_max_batch_size(100);
        let copy = BulkCopy::new(TableRef::new("t"), make_columns(), Plain, options).unwrap();
        assert_eq!(copy.effective_batch_size(), 100);
    }

    #[test]
    fn test_effective_batch_size_has_floor_of_one() {
        let options = BulkCopyOptions::new()
            .with_max_batch_size(100)
            .with_parameters()
            .with_max_parameters_for_batch(2);
        let copy = BulkCopy::new(TableRef::new("t"), make_columns(), Plain, options).unwrap();
        // 2 / 3 columns rounds to zero; degrade to single-row batches.
        assert_eq!(copy.effective_batch_size(), 1);
    }

    #[test]
    fn test_keep_identity_rejected_for_row_by_row_method() {
        let options = BulkCopyOptions::new()
            .with_method(CopyMethod::RowByRow)
            .with_keep_identity();
        let err = BulkCopy::new(TableRef::new("t"), make_columns(), Plain, options).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_identity_columns_are_skipped_unless_kept() {
        let columns = vec![
            ColumnMeta::new("id").identity(),
            ColumnMeta::new("name"),
        ];

        let copy = BulkCopy::new(
            TableRef::new("t"),
            columns.clone(),
            Plain,
            BulkCopyOptions::new(),
        )
        .unwrap();
        assert_eq!(copy.picks, vec![1]);

        let copy = BulkCopy::new(
            TableRef::new("t"),
            columns,
            Plain,
            BulkCopyOptions::new().with_keep_identity(),
        )
        .unwrap();
        assert_eq!(copy.picks, vec![0, 1]);
    }

    #[test]
    fn test_all_columns_skipped_is_a_config_error() {
        let columns = vec![ColumnMeta::new("id").identity()];
        let err = BulkCopy::new(TableRef::new("t"), columns, Plain, BulkCopyOptions::new())
            .unwrap_err();
        assert!(err.to_string().contains("no insertable columns"));
    }

    #[test]
    fn test_name_overrides_resolve_into_target() {
        let options = BulkCopyOptions::new()
            .with_table_name("t_load")
            .with_schema_name("staging");
        let copy = BulkCopy::new(
            TableRef::new("t").with_schema("prod"),
            make_columns(),
            Plain,
            options,
        )
        .unwrap();
        assert_eq!(copy.target().table, "t_load");
        assert_eq!(copy.target().schema.as_deref(), Some("staging"));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let options = BulkCopyOptions::new().with_table_name("bad\0name");
        let err =
            BulkCopy::new(TableRef::new("t"), make_columns(), Plain, options).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}
