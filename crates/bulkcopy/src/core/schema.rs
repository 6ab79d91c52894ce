//! Target table descriptors and identifier validation.
//!
//! A bulk copy invocation is addressed at a [`TableRef`] with an ordered list
//! of [`ColumnMeta`] descriptors. Identifiers are validated once at entry;
//! quoting stays with the dialect implementations.

use serde::{Deserialize, Serialize};

use crate::error::{BulkCopyError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - SQL Server: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier before it is rendered into statement text.
///
/// Identifiers cannot be bound as parameters, so anything that reaches the
/// statement builder must be checked here first. Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `BulkCopyError::Config` with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BulkCopyError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(BulkCopyError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(BulkCopyError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Table hints forwarded untouched to row sinks and dialects.
///
/// The engine itself does not create or alter tables; these only tell the
/// collaborators what kind of table the caller is addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOptions {
    /// Ordinary table.
    #[default]
    None,
    /// Session-local temporary table.
    Temporary,
    /// Global temporary table.
    GlobalTemporary,
}

/// Locator for the target table.
///
/// Only `table` is required; the optional parts qualify the name as far as
/// the target engine supports (dialects decide how many parts to render).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Table name.
    pub table: String,

    /// Schema name (e.g. `dbo`, `public`).
    #[serde(default)]
    pub schema: Option<String>,

    /// Database name.
    #[serde(default)]
    pub database: Option<String>,

    /// Linked server name (SQL Server four-part names).
    #[serde(default)]
    pub server: Option<String>,

    /// Table hints forwarded to collaborators.
    #[serde(default)]
    pub options: TableOptions,
}

impl TableRef {
    /// Create a reference to an unqualified table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            schema: None,
            database: None,
            server: None,
            options: TableOptions::None,
        }
    }

    /// Set the schema name.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the linked server name.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Set table hints.
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate every name part of the reference.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table)?;
        for part in [&self.schema, &self.database, &self.server]
            .into_iter()
            .flatten()
        {
            validate_identifier(part)?;
        }
        Ok(())
    }

    /// Unquoted dotted name for log messages.
    pub fn display_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

/// Metadata for one target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,

    /// Declared SQL type (e.g. `varchar(50)`), used when a dialect casts
    /// union-select values explicitly. Columns without a type are never cast.
    #[serde(default)]
    pub sql_type: Option<String>,

    /// Whether the column is an identity/autoincrement column.
    #[serde(default)]
    pub is_identity: bool,

    /// Whether the column is excluded from inserts (computed columns,
    /// identity columns the target generates itself).
    #[serde(default)]
    pub skip_on_insert: bool,
}

impl ColumnMeta {
    /// Create a plain insertable column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: None,
            is_identity: false,
            skip_on_insert: false,
        }
    }

    /// Set the declared SQL type.
    pub fn with_sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Mark the column as identity.
    ///
    /// Identity columns are skipped on insert unless the invocation asks to
    /// preserve identity values.
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self.skip_on_insert = true;
        self
    }

    /// Mark the column as never insertable (e.g. computed).
    pub fn skip_on_insert(mut self) -> Self {
        self.skip_on_insert = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Identifier validation =====

    #[test]
    fn test_validate_rejects_empty() {
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn test_validate_rejects_null_byte() {
        assert!(validate_identifier("users\0--").is_err());
    }

    #[test]
    fn test_validate_rejects_overlong() {
        let name = "x".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(validate_identifier(&name).is_err());
    }

    #[test]
    fn test_validate_accepts_normal_names() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("Order Details").is_ok());
        assert!(validate_identifier("таблица").is_ok());
    }

    // ===== Table references =====

    #[test]
    fn test_table_ref_builder() {
        let t = TableRef::new("orders")
            .with_schema("dbo")
            .with_database("sales")
            .with_server("reports");
        assert_eq!(t.table, "orders");
        assert_eq!(t.schema.as_deref(), Some("dbo"));
        assert_eq!(t.database.as_deref(), Some("sales"));
        assert_eq!(t.server.as_deref(), Some("reports"));
        assert_eq!(t.options, TableOptions::None);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_table_ref_validate_checks_all_parts() {
        let t = TableRef::new("orders").with_schema("bad\0schema");
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(TableRef::new("t").display_name(), "t");
        assert_eq!(
            TableRef::new("t").with_schema("s").display_name(),
            "s.t"
        );
    }

    // ===== Columns =====

    #[test]
    fn test_identity_column_skips_on_insert() {
        let col = ColumnMeta::new("id").identity();
        assert!(col.is_identity);
        assert!(col.skip_on_insert);
    }
}
