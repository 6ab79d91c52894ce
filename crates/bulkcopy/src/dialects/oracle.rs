//! Oracle dialect (Strategy pattern).
//!
//! Oracle has no bare multi-row VALUES and no literal-only SELECT, so rows
//! go through a wrapped union over `DUAL`, with the first branch cast so the
//! engine can type the union columns.

use std::fmt::Write as _;

use crate::core::traits::{ansi_literal, Dialect, MultiRowShape};
use crate::core::value::SqlValue;
use crate::error::Result;

/// Oracle dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Create a new Oracle dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &str {
        "oracle"
    }

    fn param_placeholder(&self, index: usize) -> String {
        // Oracle uses named binds; :p1, :p2, etc.
        format!(":p{}", index)
    }

    fn render_literal(&self, value: &SqlValue<'_>, out: &mut String) -> Result<()> {
        match value {
            // No boolean type in SQL; NUMBER(1) columns take 0/1
            SqlValue::Bool(v) => out.push_str(if *v { "1" } else { "0" }),
            SqlValue::Date(v) => {
                let _ = write!(out, "DATE '{}'", v.format("%Y-%m-%d"));
            }
            SqlValue::DateTime(v) => {
                let _ = write!(out, "TIMESTAMP '{}'", v.format("%Y-%m-%d %H:%M:%S%.f"));
            }
            SqlValue::DateTimeOffset(v) => {
                let _ = write!(
                    out,
                    "TIMESTAMP '{}'",
                    v.format("%Y-%m-%d %H:%M:%S%.f %:z")
                );
            }
            other => ansi_literal(other, out)?,
        }
        Ok(())
    }

    fn multi_row_shape(&self) -> MultiRowShape {
        MultiRowShape::WrappedUnion
    }

    fn union_from_clause(&self) -> Option<&str> {
        Some("FROM DUAL")
    }

    fn cast_union_parameters(&self) -> bool {
        true
    }
}
