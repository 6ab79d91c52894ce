//! Row-by-row fallback drivers.
//!
//! Every record goes through a caller-supplied single-row sink against the
//! resolved target, one insert per record. Progress and abort semantics
//! match the batching path, checked after every insert instead of after
//! every flush.

use std::pin::pin;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::schema::TableRef;
use crate::core::traits::{AsyncRowSink, RowSink};
use crate::error::{BulkCopyError, Result};
use crate::progress::{ProgressCallback, RowsCopied};

use super::notify_progress;

pub(crate) fn copy_sync<T, S>(
    target: &TableRef,
    source: impl IntoIterator<Item = T>,
    sink: &mut S,
    notify_after: usize,
    callback: &mut Option<ProgressCallback>,
) -> Result<RowsCopied>
where
    S: RowSink<T>,
{
    let mut progress = RowsCopied::new();
    for record in source {
        sink.insert(&record, target)
            .map_err(|source| BulkCopyError::insert(progress.rows_copied, source))?;
        progress.rows_copied += 1;
        if notify_progress(&mut progress, notify_after, callback) {
            break;
        }
    }
    Ok(progress)
}

pub(crate) async fn copy_async<T, S>(
    target: &TableRef,
    source: impl Stream<Item = T>,
    sink: &mut S,
    notify_after: usize,
    callback: &mut Option<ProgressCallback>,
    cancel: &CancellationToken,
) -> Result<RowsCopied>
where
    T: Send + Sync,
    S: AsyncRowSink<T>,
{
    let mut source = pin!(source);
    let mut progress = RowsCopied::new();
    loop {
        if cancel.is_cancelled() {
            debug!(
                "{}: row-by-row copy cancelled after {} rows",
                target.display_name(),
                progress.rows_copied
            );
            break;
        }
        let Some(record) = source.next().await else {
            break;
        };
        sink.insert(&record, target)
            .await
            .map_err(|source| BulkCopyError::insert(progress.rows_copied, source))?;
        progress.rows_copied += 1;
        if notify_progress(&mut progress, notify_after, callback) {
            break;
        }
    }
    Ok(progress)
}
