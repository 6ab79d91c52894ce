//! SQLite dialect (Strategy pattern).
//!
//! SQLite takes the union-select statement shape and a small parameter
//! ceiling; quoting and literals are close to the ANSI defaults.

use crate::core::traits::{ansi_literal, Dialect, MultiRowShape};
use crate::core::value::SqlValue;
use crate::error::Result;

/// SQLite dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Create a new SQLite dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn render_literal(&self, value: &SqlValue<'_>, out: &mut String) -> Result<()> {
        match value {
            // No boolean literals in older versions; integer affinity
            SqlValue::Bool(v) => out.push_str(if *v { "1" } else { "0" }),
            other => ansi_literal(other, out)?,
        }
        Ok(())
    }

    fn multi_row_shape(&self) -> MultiRowShape {
        // SELECT ... UNION ALL SELECT ... works on every version; a bare
        // SELECT needs no FROM clause
        MultiRowShape::UnionSelect
    }

    fn max_parameters(&self) -> usize {
        // SQLITE_MAX_VARIABLE_NUMBER defaults to 999
        999
    }
}
