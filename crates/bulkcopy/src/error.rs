//! Error types for the bulk copy library.

use thiserror::Error;

/// Boxed error produced by collaborator implementations (statement
/// executors and row sinks) and carried as the source of the library error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for bulk copy operations.
#[derive(Error, Debug)]
pub enum BulkCopyError {
    /// Configuration error (incompatible options, invalid identifiers,
    /// empty column set)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A row could not be rendered into the statement under construction
    #[error("Render error: {0}")]
    Render(String),

    /// The execution collaborator failed for a flushed batch.
    ///
    /// `rows_copied` counts only rows from batches that executed
    /// successfully before the failure.
    #[error("Batch execution failed after {rows_copied} rows copied: {source}")]
    Execution {
        rows_copied: u64,
        #[source]
        source: BoxError,
    },

    /// A single-row insert failed in the row-by-row path.
    #[error("Row insert failed after {rows_copied} rows copied: {source}")]
    Insert {
        rows_copied: u64,
        #[source]
        source: BoxError,
    },
}

impl BulkCopyError {
    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        BulkCopyError::Config(message.into())
    }

    /// Create a Render error
    pub fn render(message: impl Into<String>) -> Self {
        BulkCopyError::Render(message.into())
    }

    /// Create an Execution error carrying the successful-flush row count
    pub fn execution(rows_copied: u64, source: impl Into<BoxError>) -> Self {
        BulkCopyError::Execution {
            rows_copied,
            source: source.into(),
        }
    }

    /// Create an Insert error carrying the successful-insert row count
    pub fn insert(rows_copied: u64, source: impl Into<BoxError>) -> Self {
        BulkCopyError::Insert {
            rows_copied,
            source: source.into(),
        }
    }
}

/// Result type alias for bulk copy operations.
pub type Result<T> = std::result::Result<T, BulkCopyError>;
