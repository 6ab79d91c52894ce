//! Core abstractions for engine-agnostic bulk loading.
//!
//! This module provides the foundational types and traits used throughout
//! the batching engine:
//!
//! - [`schema`]: Target table and column metadata types
//! - [`value`]: SQL value representation with efficient memory usage
//! - [`traits`]: Core traits for dialects, executors, sinks, and records
//!
//! # Architecture
//!
//! The core module defines engine-agnostic abstractions that are implemented
//! by dialect modules (`dialects/mssql`, `dialects/postgres`, etc.) and by
//! caller-provided executors. This separation enables:
//!
//! - **Extensibility**: New target engines can be added without modifying core code
//! - **Testability**: Batching logic can be tested with mock executors
//! - **Maintainability**: Clear boundaries between generic and engine-specific code
//!
//! # Design Patterns
//!
//! - **Strategy**: `Dialect` provides interchangeable rendering and limit rules
//! - **Template Method**: Default trait method implementations define portable behavior

pub mod schema;
pub mod traits;
pub mod value;

// Re-export commonly used types for convenience
pub use schema::{ColumnMeta, TableOptions, TableRef};
pub use traits::{
    AsyncBatchExecutor, AsyncRowSink, BatchExecutor, Dialect, Executed, MultiRowShape, RowSink,
    ToRow,
};
pub use value::{SqlNullType, SqlValue};
