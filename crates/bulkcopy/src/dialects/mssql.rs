//! SQL Server dialect (Strategy pattern).
//!
//! Provides SQL Server-specific identifier quoting, multi-part table names,
//! parameter placeholders, literal syntax, and engine limits.

use std::fmt::Write as _;

use crate::core::schema::TableRef;
use crate::core::traits::{ansi_literal, push_str_literal, Dialect};
use crate::core::value::SqlValue;
use crate::error::Result;

/// Microsoft SQL Server dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new SQL Server dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn quote_ident(&self, name: &str) -> String {
        // MSSQL uses square brackets for identifier quoting
        // Handle names that contain closing brackets by doubling them
        format!("[{}]", name.replace(']', "]]"))
    }

    fn render_table(&self, table: &TableRef) -> String {
        // Multi-part names keep their dots even when a middle part is
        // omitted: server.database..table, database..table.
        let name = self.quote_ident(&table.table);
        let schema = table.schema.as_deref().map(|s| self.quote_ident(s));
        let database = table.database.as_deref().map(|s| self.quote_ident(s));
        let server = table.server.as_deref().map(|s| self.quote_ident(s));

        match (server, database, schema) {
            (Some(srv), db, sch) => format!(
                "{}.{}.{}.{}",
                srv,
                db.unwrap_or_default(),
                sch.unwrap_or_default(),
                name
            ),
            (None, Some(db), sch) => format!("{}.{}.{}", db, sch.unwrap_or_default(), name),
            (None, None, Some(sch)) => format!("{}.{}", sch, name),
            (None, None, None) => name,
        }
    }

    fn param_placeholder(&self, index: usize) -> String {
        // MSSQL uses @P1, @P2, etc. (1-based)
        format!("@P{}", index)
    }

    fn render_literal(&self, value: &SqlValue<'_>, out: &mut String) -> Result<()> {
        match value {
            // No boolean literals; BIT columns take 0/1
            SqlValue::Bool(v) => out.push_str(if *v { "1" } else { "0" }),
            // National character literal keeps non-ASCII text intact
            SqlValue::Text(v) => {
                out.push('N');
                push_str_literal(out, v);
            }
            SqlValue::Bytes(v) => {
                out.push_str("0x");
                for b in v.iter() {
                    let _ = write!(out, "{:02X}", b);
                }
            }
            other => ansi_literal(other, out)?,
        }
        Ok(())
    }

    fn max_parameters(&self) -> usize {
        // sp_executesql caps at 2100 parameters per statement
        2100
    }
}
