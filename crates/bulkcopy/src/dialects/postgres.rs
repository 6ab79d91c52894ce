//! PostgreSQL dialect (Strategy pattern).
//!
//! Provides PostgreSQL-specific parameter placeholders, bytea literals, and
//! the extended-protocol parameter limit.

use std::fmt::Write as _;

use crate::core::traits::{ansi_literal, Dialect};
use crate::core::value::SqlValue;
use crate::error::Result;

/// PostgreSQL dialect implementation.
///
/// Identifier quoting and most literals follow the ANSI defaults.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn param_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc. (1-based)
        format!("${}", index)
    }

    fn render_literal(&self, value: &SqlValue<'_>, out: &mut String) -> Result<()> {
        match value {
            // bytea hex input form
            SqlValue::Bytes(v) => {
                out.push_str("'\\x");
                for b in v.iter() {
                    let _ = write!(out, "{:02x}", b);
                }
                out.push('\'');
            }
            other => ansi_literal(other, out)?,
        }
        Ok(())
    }

    fn max_parameters(&self) -> usize {
        // Bind message carries a 16-bit parameter count
        65535
    }
}
