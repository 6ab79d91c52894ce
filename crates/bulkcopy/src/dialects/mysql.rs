//! MySQL dialect (Strategy pattern).
//!
//! Provides MySQL-specific identifier quoting, backslash-aware string
//! literals, and the prepared-statement placeholder limit.

use crate::core::traits::{ansi_literal, Dialect};
use crate::core::value::SqlValue;
use crate::error::Result;

/// MySQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn quote_ident(&self, name: &str) -> String {
        // MySQL uses backticks; embedded backticks are doubled
        format!("`{}`", name.replace('`', "``"))
    }

    fn render_literal(&self, value: &SqlValue<'_>, out: &mut String) -> Result<()> {
        match value {
            // Backslash is an escape character unless NO_BACKSLASH_ESCAPES
            // is set, so it gets doubled alongside the quote
            SqlValue::Text(v) => {
                out.push('\'');
                for c in v.chars() {
                    match c {
                        '\'' => out.push_str("''"),
                        '\\' => out.push_str("\\\\"),
                        _ => out.push(c),
                    }
                }
                out.push('\'');
            }
            other => ansi_literal(other, out)?,
        }
        Ok(())
    }

    fn max_parameters(&self) -> usize {
        // Prepared statements carry a 16-bit placeholder count
        65535
    }
}
