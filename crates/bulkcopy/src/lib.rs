//! # bulkcopy
//!
//! Adaptive multi-row SQL bulk loading.
//!
//! This library converts an ordered sequence of typed records into the
//! smallest sufficient number of INSERT statements and hands them to a
//! caller-supplied executor, with support for:
//!
//! - **Adaptive batching** against hard engine limits on parameter count
//!   and statement length, with safe rollback of the row that tips a limit
//! - **Three statement shapes** (values list, union select, wrapped union)
//!   selected by the active dialect
//! - **Literal inlining or parameter binding** for row values
//! - **Progress callbacks** with cooperative abort, plus a row-by-row
//!   fallback path
//! - **Sync and async drivers** sharing the exact same batching behavior
//! - **Shipped dialects** for SQL Server, PostgreSQL, MySQL, SQLite, and
//!   Oracle
//!
//! ## Example
//!
//! ```rust,no_run
//! use bulkcopy::dialects::PostgresDialect;
//! use bulkcopy::{
//!     BatchExecutor, BoxError, BulkCopy, BulkCopyOptions, ColumnMeta, Executed, SqlValue,
//!     TableRef, ToRow,
//! };
//!
//! struct Order {
//!     id: i32,
//!     sku: String,
//! }
//!
//! impl ToRow for Order {
//!     fn to_row(&self) -> bulkcopy::Result<Vec<SqlValue<'_>>> {
//!         Ok(vec![self.id.into(), self.sku.as_str().into()])
//!     }
//! }
//!
//! struct PrintExecutor;
//!
//! impl BatchExecutor for PrintExecutor {
//!     fn execute(
//!         &mut self,
//!         sql: &str,
//!         _params: &[SqlValue<'static>],
//!     ) -> Result<Executed, BoxError> {
//!         println!("{}", sql);
//!         Ok(Executed::Written(0))
//!     }
//! }
//!
//! fn main() -> bulkcopy::Result<()> {
//!     let columns = vec![ColumnMeta::new("id"), ColumnMeta::new("sku")];
//!     let mut copy = BulkCopy::new(
//!         TableRef::new("orders").with_schema("sales"),
//!         columns,
//!         PostgresDialect::new(),
//!         BulkCopyOptions::new().with_max_batch_size(500),
//!     )?;
//!
//!     let orders = vec![
//!         Order { id: 1, sku: "A-100".into() },
//!         Order { id: 2, sku: "B-200".into() },
//!     ];
//!     let progress = copy.copy(orders, &mut PrintExecutor)?;
//!     println!("copied {} rows", progress.rows_copied);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod dialects;
pub mod engine;
pub mod error;
pub mod options;
pub mod progress;

// Re-exports for convenient access
pub use crate::core::schema::{ColumnMeta, TableOptions, TableRef};
pub use crate::core::traits::{
    AsyncBatchExecutor, AsyncRowSink, BatchExecutor, Dialect, Executed, MultiRowShape, RowSink,
    ToRow,
};
pub use crate::core::value::{SqlNullType, SqlValue};
pub use engine::BulkCopy;
pub use error::{BoxError, BulkCopyError, Result};
pub use options::{BulkCopyOptions, CopyMethod};
pub use progress::{ProgressCallback, RowsCopied};

// Callers of the async entry points need a token type; re-export it so they
// do not have to depend on tokio-util directly.
pub use tokio_util::sync::CancellationToken;
