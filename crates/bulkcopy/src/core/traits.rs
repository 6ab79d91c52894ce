//! Core traits at the engine's collaborator seams.
//!
//! This module defines the abstractions the batching engine is written
//! against:
//!
//! - [`Dialect`]: SQL rendering rules plus the provider capability profile
//! - [`BatchExecutor`] / [`AsyncBatchExecutor`]: run one flushed statement
//! - [`RowSink`] / [`AsyncRowSink`]: single-row insert path for row-by-row mode
//! - [`ToRow`]: caller-side record-to-values conversion
//!
//! # Design Patterns
//!
//! - **Strategy**: `Dialect` makes engine differences (quoting, placeholders,
//!   multi-row shape, limits) interchangeable behind one interface
//! - **Template Method**: most `Dialect` methods have portable ANSI defaults;
//!   implementations override only what their engine deviates on

use std::fmt::Write as _;

use async_trait::async_trait;

use crate::error::{BoxError, BulkCopyError, Result};

use super::schema::TableRef;
use super::value::SqlValue;

/// Statement shape used when rendering a multi-row batch.
///
/// Which shape a target engine accepts is a provider capability, so the
/// active dialect picks one once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiRowShape {
    /// `INSERT INTO t (cols) VALUES (r1), (r2), ...`
    ValuesList,
    /// `INSERT INTO t (cols) SELECT v1, v2 <from> UNION ALL SELECT ...`
    UnionSelect,
    /// `INSERT INTO t (cols) SELECT * FROM ( SELECT ... UNION ALL ... )`
    WrappedUnion,
}

/// SQL rendering rules and capability profile for one target engine.
///
/// Every method has a portable default; a dialect overrides the ones its
/// engine deviates on. The limit methods are the hard ceilings the batching
/// loop enforces after every appended row.
pub trait Dialect: Send + Sync {
    /// Get the dialect identifier (e.g. "mssql", "postgres").
    fn name(&self) -> &str;

    /// Quote an identifier (table name, column name, etc.).
    ///
    /// - default/PostgreSQL: `"identifier"`
    /// - MSSQL: `[identifier]`
    fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Render the qualified, quoted target table name.
    ///
    /// The default joins whichever of server/database/schema/table are
    /// present with dots; dialects with fixed part counts override.
    fn render_table(&self, table: &TableRef) -> String {
        let mut out = String::new();
        let parts = [
            table.server.as_deref(),
            table.database.as_deref(),
            table.schema.as_deref(),
            Some(table.table.as_str()),
        ];
        for part in parts.into_iter().flatten() {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(&self.quote_ident(part));
        }
        out
    }

    /// Get a parameter placeholder for the given 1-based index.
    ///
    /// - default/MySQL: `?`
    /// - PostgreSQL: `$1`, `$2`, ...
    /// - MSSQL: `@p1`, `@p2`, ...
    fn param_placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    /// Render a value as an inline SQL literal, appending to `out`.
    ///
    /// The default emits portable ANSI forms. Fails for values with no
    /// literal representation (non-finite floats).
    fn render_literal(&self, value: &SqlValue<'_>, out: &mut String) -> Result<()> {
        ansi_literal(value, out)
    }

    /// Which multi-row statement shape this engine accepts.
    fn multi_row_shape(&self) -> MultiRowShape {
        MultiRowShape::ValuesList
    }

    /// Dummy-table fragment for the union shapes (e.g. `FROM DUAL`).
    ///
    /// `None` for engines that allow a bare literal `SELECT`.
    fn union_from_clause(&self) -> Option<&str> {
        None
    }

    /// Whether union-select values are wrapped in explicit `CAST`s so the
    /// engine can infer column types from the first branch.
    fn cast_union_parameters(&self) -> bool {
        false
    }

    /// Whether every union branch is cast, not just the first.
    /// Only consulted when [`Dialect::cast_union_parameters`] is on.
    fn cast_all_union_rows(&self) -> bool {
        false
    }

    /// Hard ceiling on bound parameters per statement.
    fn max_parameters(&self) -> usize {
        999
    }

    /// Hard ceiling on statement text length in bytes.
    fn max_sql_length(&self) -> usize {
        100_000
    }
}

/// Outcome of executing one flushed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executed {
    /// Statement ran; rows affected as reported by the engine.
    Written(u64),
    /// Soft stop: the statement was handled, but the executor wants no
    /// further batches. Not an error; the driver returns the progress
    /// accumulated so far, this batch included.
    Stop,
}

/// Execute flushed batch statements, blocking.
///
/// Implementations wrap a live connection; errors are returned boxed and the
/// engine attaches row-progress context before propagating.
pub trait BatchExecutor {
    /// Execute one statement with its bound parameters.
    ///
    /// `params` is empty when the invocation renders literals inline.
    fn execute(
        &mut self,
        sql: &str,
        params: &[SqlValue<'static>],
    ) -> std::result::Result<Executed, BoxError>;
}

/// Execute flushed batch statements, suspending.
#[async_trait]
pub trait AsyncBatchExecutor: Send {
    /// Execute one statement with its bound parameters.
    async fn execute(
        &mut self,
        sql: &str,
        params: &[SqlValue<'static>],
    ) -> std::result::Result<Executed, BoxError>;
}

/// Single-row insert path used by row-by-row mode, blocking.
///
/// `target` is the fully resolved table reference (name overrides already
/// applied) including table hints.
pub trait RowSink<T> {
    /// Insert one record.
    fn insert(&mut self, record: &T, target: &TableRef) -> std::result::Result<(), BoxError>;
}

/// Single-row insert path used by row-by-row mode, suspending.
#[async_trait]
pub trait AsyncRowSink<T: Send + Sync>: Send {
    /// Insert one record.
    async fn insert(
        &mut self,
        record: &T,
        target: &TableRef,
    ) -> std::result::Result<(), BoxError>;
}

/// Conversion from a caller record to column values.
///
/// Values must align positionally with the column list the invocation was
/// created with; the engine itself drops values for columns it skips
/// (identity, computed). Conversion failures surface as render errors and
/// abort the invocation.
pub trait ToRow {
    /// Render this record's column values.
    fn to_row(&self) -> Result<Vec<SqlValue<'_>>>;
}

/// Render `value` in portable ANSI form, appending to `out`.
///
/// This is the default behind [`Dialect::render_literal`]; dialect
/// implementations delegate here for the kinds they do not override.
pub fn ansi_literal(value: &SqlValue<'_>, out: &mut String) -> Result<()> {
    match value {
        SqlValue::Null(_) => out.push_str("NULL"),
        SqlValue::Bool(v) => out.push_str(if *v { "TRUE" } else { "FALSE" }),
        SqlValue::I16(v) => write_num(out, v),
        SqlValue::I32(v) => write_num(out, v),
        SqlValue::I64(v) => write_num(out, v),
        SqlValue::F32(v) => {
            if !v.is_finite() {
                return Err(BulkCopyError::render(format!(
                    "float value {} has no SQL literal form",
                    v
                )));
            }
            write_num(out, v);
        }
        SqlValue::F64(v) => {
            if !v.is_finite() {
                return Err(BulkCopyError::render(format!(
                    "float value {} has no SQL literal form",
                    v
                )));
            }
            write_num(out, v);
        }
        SqlValue::Text(v) => push_str_literal(out, v),
        SqlValue::Bytes(v) => {
            out.push_str("X'");
            for b in v.iter() {
                let _ = write!(out, "{:02X}", b);
            }
            out.push('\'');
        }
        SqlValue::Uuid(v) => {
            out.push('\'');
            let _ = write!(out, "{}", v);
            out.push('\'');
        }
        SqlValue::Decimal(v) => write_num(out, v),
        SqlValue::DateTime(v) => {
            out.push('\'');
            let _ = write!(out, "{}", v.format("%Y-%m-%d %H:%M:%S%.f"));
            out.push('\'');
        }
        SqlValue::DateTimeOffset(v) => {
            out.push('\'');
            let _ = write!(out, "{}", v.format("%Y-%m-%d %H:%M:%S%.f %:z"));
            out.push('\'');
        }
        SqlValue::Date(v) => {
            out.push('\'');
            let _ = write!(out, "{}", v.format("%Y-%m-%d"));
            out.push('\'');
        }
        SqlValue::Time(v) => {
            out.push('\'');
            let _ = write!(out, "{}", v.format("%H:%M:%S%.f"));
            out.push('\'');
        }
    }
    Ok(())
}

/// Append a single-quoted string literal with embedded quotes doubled.
pub fn push_str_literal(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
}

fn write_num<T: std::fmt::Display>(out: &mut String, v: T) {
    // Writing to a String cannot fail.
    let _ = write!(out, "{}", v);
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::core::value::SqlNullType;

    struct Ansi;

    impl Dialect for Ansi {
        fn name(&self) -> &str {
            "ansi"
        }
    }

    fn literal(value: SqlValue<'_>) -> String {
        let mut out = String::new();
        ansi_literal(&value, &mut out).unwrap();
        out
    }

    #[test]
    fn test_default_quoting_and_placeholders() {
        let d = Ansi;
        assert_eq!(d.quote_ident("users"), "\"users\"");
        assert_eq!(d.quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(d.param_placeholder(3), "?");
    }

    #[test]
    fn test_default_table_rendering_joins_present_parts() {
        let d = Ansi;
        let t = TableRef::new("orders").with_schema("sales");
        assert_eq!(d.render_table(&t), "\"sales\".\"orders\"");

        let t = TableRef::new("orders");
        assert_eq!(d.render_table(&t), "\"orders\"");
    }

    #[test]
    fn test_ansi_literals() {
        assert_eq!(literal(SqlValue::Null(SqlNullType::I32)), "NULL");
        assert_eq!(literal(SqlValue::Bool(true)), "TRUE");
        assert_eq!(literal(SqlValue::I64(-7)), "-7");
        assert_eq!(literal(SqlValue::Text(Cow::Borrowed("it's"))), "'it''s'");
        assert_eq!(
            literal(SqlValue::Bytes(Cow::Borrowed(&[0xDE, 0xAD]))),
            "X'DEAD'"
        );
    }

    #[test]
    fn test_non_finite_floats_do_not_render() {
        let mut out = String::new();
        assert!(ansi_literal(&SqlValue::F64(f64::NAN), &mut out).is_err());
        assert!(ansi_literal(&SqlValue::F32(f32::INFINITY), &mut out).is_err());
    }

    #[test]
    fn test_temporal_literals() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(literal(SqlValue::DateTime(dt)), "'2024-05-01 12:30:00'");
        assert_eq!(
            literal(SqlValue::Date(dt.date())),
            "'2024-05-01'"
        );
    }
}
