//! Per-invocation bulk copy configuration.
//!
//! [`BulkCopyOptions`] is plain data: it can be deserialized from a config
//! file or assembled programmatically with the builder methods. The progress
//! callback is not part of this surface; it attaches to the engine via
//! [`BulkCopy::with_progress`](crate::engine::BulkCopy::with_progress).

use serde::{Deserialize, Serialize};

use crate::core::schema::TableRef;

/// How records reach the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMethod {
    /// Multi-row statements assembled by the adaptive batching loop.
    #[default]
    MultipleRows,

    /// One single-row insert per record, through a caller-supplied sink.
    RowByRow,
}

/// Options controlling one bulk copy invocation.
///
/// All fields have usable defaults; `Default::default()` gives literal-mode
/// multi-row copying with 1000-row batches and no progress callbacks.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BulkCopyOptions {
    /// Copy method (default: multiple_rows).
    #[serde(default)]
    pub method: CopyMethod,

    /// Rows per batch statement (default: 1000). Capped further by the
    /// dialect's parameter limit when `use_parameters` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_size: Option<usize>,

    /// Bind row values as parameters instead of inlining literals
    /// (default: false).
    #[serde(default)]
    pub use_parameters: bool,

    /// Override for the dialect's parameter ceiling when computing the
    /// effective batch size. The dialect ceiling still applies as the hard
    /// overflow limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parameters_for_batch: Option<usize>,

    /// Invoke the progress callback whenever the running row count reaches
    /// a multiple of this value. 0 disables callbacks (default).
    #[serde(default)]
    pub notify_after: usize,

    /// Copy values into identity columns instead of skipping them
    /// (default: false). Incompatible with row-by-row copying.
    #[serde(default)]
    pub keep_identity: bool,

    /// Target table name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Target schema name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    /// Target database name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,

    /// Target linked-server name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

impl BulkCopyOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the copy method.
    pub fn with_method(mut self, method: CopyMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the batch size hint.
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = Some(size);
        self
    }

    /// Enable parameter binding.
    pub fn with_parameters(mut self) -> Self {
        self.use_parameters = true;
        self
    }

    /// Override the parameter ceiling used for batch sizing.
    pub fn with_max_parameters_for_batch(mut self, max: usize) -> Self {
        self.max_parameters_for_batch = Some(max);
        self
    }

    /// Set the notify interval (rows between progress callbacks).
    pub fn with_notify_after(mut self, rows: usize) -> Self {
        self.notify_after = rows;
        self
    }

    /// Keep source values for identity columns.
    pub fn with_keep_identity(mut self) -> Self {
        self.keep_identity = true;
        self
    }

    /// Override the target table name.
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Override the target schema name.
    pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = Some(name.into());
        self
    }

    /// Override the target database name.
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    /// Override the target server name.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Effective batch size hint before limit capping (floor of one row).
    pub fn get_batch_size(&self) -> usize {
        self.max_batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1)
    }

    /// Apply the name overrides to `target`, keeping everything they do
    /// not replace.
    pub fn resolve_target(&self, target: &TableRef) -> TableRef {
        let mut resolved = target.clone();
        if let Some(name) = &self.table_name {
            resolved.table = name.clone();
        }
        if let Some(schema) = &self.schema_name {
            resolved.schema = Some(schema.clone());
        }
        if let Some(database) = &self.database_name {
            resolved.database = Some(database.clone());
        }
        if let Some(server) = &self.server_name {
            resolved.server = Some(server.clone());
        }
        resolved
    }
}

/// Batch size used when the caller gives no hint.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = BulkCopyOptions::default();
        assert_eq!(opts.method, CopyMethod::MultipleRows);
        assert_eq!(opts.get_batch_size(), DEFAULT_BATCH_SIZE);
        assert!(!opts.use_parameters);
        assert!(!opts.keep_identity);
        assert_eq!(opts.notify_after, 0);
    }

    #[test]
    fn test_batch_size_floor() {
        let opts = BulkCopyOptions::new().with_max_batch_size(0);
        assert_eq!(opts.get_batch_size(), 1);
    }

    #[test]
    fn test_resolve_target_applies_overrides() {
        let opts = BulkCopyOptions::new()
            .with_table_name("orders_staging")
            .with_schema_name("load");
        let target = TableRef::new("orders").with_schema("sales").with_database("erp");

        let resolved = opts.resolve_target(&target);
        assert_eq!(resolved.table, "orders_staging");
        assert_eq!(resolved.schema.as_deref(), Some("load"));
        assert_eq!(resolved.database.as_deref(), Some("erp"));
        assert_eq!(resolved.server, None);
    }

    #[test]
    fn test_serde_round_trip_with_sparse_fields() {
        let json = r#"{"method":"row_by_row","notify_after":50}"#;
        let opts: BulkCopyOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.method, CopyMethod::RowByRow);
        assert_eq!(opts.notify_after, 50);
        assert_eq!(opts.max_batch_size, None);
    }
}
