//! Mutable accumulation buffer for one batch statement.
//!
//! [`BatchBuilder`] owns the statement text under construction, the bound
//! parameter list aligned with placeholders already emitted, and the
//! bookkeeping needed to undo the most recently appended row. The strategy
//! variants write through it; the driver owns it exclusively for the whole
//! invocation.
//!
//! Key invariant: truncating the text and parameters back to the row marks
//! exactly undoes the last appended row, leaving the buffer as it was after
//! the previous row (or after the header, if the batch is empty).

use crate::core::schema::ColumnMeta;
use crate::core::traits::Dialect;
use crate::core::value::SqlValue;
use crate::error::{BulkCopyError, Result};

/// When row values are wrapped in explicit `CAST`s.
///
/// Only the union shapes cast; the values-list shape always renders plain
/// values. Casting applies to bound placeholders, never to inlined literals,
/// and never to a column with no declared SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CastMode {
    /// No casts.
    Never,
    /// Cast the first row of each physical batch; the engine infers the rest.
    FirstRow,
    /// Cast every row.
    All,
}

/// Accumulation buffer for one invocation, reused across physical batches.
pub(crate) struct BatchBuilder<'a> {
    dialect: &'a dyn Dialect,
    /// Rendered, quoted target table name.
    table_sql: String,
    /// Column list as supplied at entry; rows are positionally aligned
    /// with it.
    columns: &'a [ColumnMeta],
    /// Indices into `columns` of the columns actually inserted.
    picks: &'a [usize],
    use_parameters: bool,

    sql: String,
    params: Vec<SqlValue<'static>>,
    /// Rows currently represented in the open batch.
    row_count: usize,
    /// Text length of the invariant statement header.
    header_len: usize,
    /// Rollback checkpoint: text length before the last appended row.
    last_row_sql_mark: usize,
    /// Rollback checkpoint: parameter count before the last appended row.
    last_row_param_mark: usize,
}

impl<'a> BatchBuilder<'a> {
    pub(crate) fn new(
        dialect: &'a dyn Dialect,
        table_sql: String,
        columns: &'a [ColumnMeta],
        picks: &'a [usize],
        use_parameters: bool,
    ) -> Self {
        Self {
            dialect,
            table_sql,
            columns,
            picks,
            use_parameters,
            sql: String::new(),
            params: Vec::new(),
            row_count: 0,
            header_len: 0,
            last_row_sql_mark: 0,
            last_row_param_mark: 0,
        }
    }

    // ===== Accessors =====

    /// The active dialect, at the invocation lifetime so callers can hold
    /// it across mutations of the builder.
    pub(crate) fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub(crate) fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn params(&self) -> &[SqlValue<'static>] {
        &self.params
    }

    pub(crate) fn row_count(&self) -> usize {
        self.row_count
    }

    pub(crate) fn param_count(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn sql_len(&self) -> usize {
        self.sql.len()
    }

    // ===== Text assembly =====

    pub(crate) fn push_str(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    /// Emit `INSERT INTO <table> (<inserted columns>)`, shared by all
    /// statement shapes.
    pub(crate) fn push_insert_prefix(&mut self) {
        self.sql.push_str("INSERT INTO ");
        self.sql.push_str(&self.table_sql);
        self.sql.push_str(" (");
        for (i, &src) in self.picks.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            let quoted = self.dialect.quote_ident(&self.columns[src].name);
            self.sql.push_str(&quoted);
        }
        self.sql.push(')');
    }

    /// Record the end of the invariant header. Called once per invocation
    /// after the active strategy has emitted its opening text; `reset`
    /// truncates back to this point.
    pub(crate) fn set_header(&mut self) {
        self.header_len = self.sql.len();
        self.last_row_sql_mark = self.sql.len();
        self.last_row_param_mark = 0;
    }

    /// Snapshot the rollback checkpoint. Called immediately before every
    /// row append.
    pub(crate) fn mark_row(&mut self) {
        self.last_row_sql_mark = self.sql.len();
        self.last_row_param_mark = self.params.len();
    }

    /// Undo the most recent row append, restoring text, parameters, and row
    /// count to the checkpoint. Valid only directly after an append.
    pub(crate) fn rollback_row(&mut self) {
        self.sql.truncate(self.last_row_sql_mark);
        self.params.truncate(self.last_row_param_mark);
        self.row_count -= 1;
    }

    /// Render one row's values as a comma-separated list, either as bound
    /// placeholders or inlined literals, and count the row.
    ///
    /// `row` must align with the column list supplied at entry; values for
    /// skipped columns are ignored.
    pub(crate) fn push_row_values(
        &mut self,
        row: &[SqlValue<'_>],
        cast: CastMode,
    ) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(BulkCopyError::render(format!(
                "row has {} values but {} columns are declared",
                row.len(),
                self.columns.len()
            )));
        }

        let cast_row = match cast {
            CastMode::Never => false,
            CastMode::All => true,
            CastMode::FirstRow => self.row_count == 0,
        };

        let dialect = self.dialect;
        for (i, &src) in self.picks.iter().enumerate() {
            if i > 0 {
                self.sql.push(',');
            }
            let value = &row[src];
            if self.use_parameters {
                let placeholder = dialect.param_placeholder(self.params.len() + 1);
                match self.columns[src].sql_type.as_deref() {
                    Some(sql_type) if cast_row => {
                        self.sql.push_str("CAST(");
                        self.sql.push_str(&placeholder);
                        self.sql.push_str(" AS ");
                        self.sql.push_str(sql_type);
                        self.sql.push(')');
                    }
                    _ => self.sql.push_str(&placeholder),
                }
                self.params.push(value.clone().into_owned());
            } else {
                dialect.render_literal(value, &mut self.sql)?;
            }
        }

        self.row_count += 1;
        Ok(())
    }

    /// Drop the last `n` bytes of statement text (trailing separators).
    pub(crate) fn trim_tail(&mut self, n: usize) {
        self.sql.truncate(self.sql.len().saturating_sub(n));
    }

    /// Restore the header-only state for the next physical batch.
    pub(crate) fn reset(&mut self) {
        self.sql.truncate(self.header_len);
        self.params.clear();
        self.row_count = 0;
        self.last_row_sql_mark = self.header_len;
        self.last_row_param_mark = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PgLike;

    impl Dialect for PgLike {
        fn name(&self) -> &str {
            "pglike"
        }

        fn param_placeholder(&self, index: usize) -> String {
            format!("${}", index)
        }
    }

    fn make_columns() -> Vec<ColumnMeta> {
        vec![
            ColumnMeta::new("id").with_sql_type("int"),
            ColumnMeta::new("name").with_sql_type("varchar(64)"),
        ]
    }

    fn make_builder<'a>(
        dialect: &'a dyn Dialect,
        columns: &'a [ColumnMeta],
        picks: &'a [usize],
        use_parameters: bool,
    ) -> BatchBuilder<'a> {
        let mut builder = BatchBuilder::new(
            dialect,
            "\"t\"".to_string(),
            columns,
            picks,
            use_parameters,
        );
        builder.push_insert_prefix();
        builder.push_str(" VALUES ");
        builder.set_header();
        builder
    }

    fn row(id: i32, name: &str) -> Vec<SqlValue<'static>> {
        vec![SqlValue::from(id), SqlValue::from(name.to_string())]
    }

    #[test]
    fn test_insert_prefix_quotes_picked_columns() {
        let dialect = PgLike;
        let columns = make_columns();
        let picks = vec![0, 1];
        let builder = make_builder(&dialect, &columns, &picks, false);
        assert_eq!(builder.sql(), "INSERT INTO \"t\" (\"id\", \"name\") VALUES ");
    }

    #[test]
    fn test_literal_row_rendering() {
        let dialect = PgLike;
        let columns = make_columns();
        let picks = vec![0, 1];
        let mut builder = make_builder(&dialect, &columns, &picks, false);

        builder.push_str("(");
        builder.push_row_values(&row(1, "a"), CastMode::Never).unwrap();
        builder.push_str("),");

        assert_eq!(
            builder.sql(),
            "INSERT INTO \"t\" (\"id\", \"name\") VALUES (1,'a'),"
        );
        assert_eq!(builder.param_count(), 0);
        assert_eq!(builder.row_count(), 1);
    }

    #[test]
    fn test_parameter_placeholders_number_across_rows() {
        let dialect = PgLike;
        let columns = make_columns();
        let picks = vec![0, 1];
        let mut builder = make_builder(&dialect, &columns, &picks, true);

        builder.push_str("(");
        builder.push_row_values(&row(1, "a"), CastMode::Never).unwrap();
        builder.push_str("),(");
        builder.push_row_values(&row(2, "b"), CastMode::Never).unwrap();
        builder.push_str("),");

        assert_eq!(
            builder.sql(),
            "INSERT INTO \"t\" (\"id\", \"name\") VALUES ($1,$2),($3,$4),"
        );
        assert_eq!(builder.param_count(), 4);
    }

    #[test]
    fn test_cast_first_row_only() {
        let dialect = PgLike;
        let columns = make_columns();
        let picks = vec![0, 1];
        let mut builder = BatchBuilder::new(&dialect, "\"t\"".to_string(), &columns, &picks, true);
        builder.push_insert_prefix();
        builder.set_header();

        builder.push_str(" SELECT ");
        builder.push_row_values(&row(1, "a"), CastMode::FirstRow).unwrap();
        builder.push_str(" UNION ALL SELECT ");
        builder.push_row_values(&row(2, "b"), CastMode::FirstRow).unwrap();

        let sql = builder.sql();
        assert!(sql.contains("SELECT CAST($1 AS int),CAST($2 AS varchar(64))"));
        assert!(sql.contains("UNION ALL SELECT $3,$4"));
    }

    #[test]
    fn test_untyped_column_is_never_cast() {
        let dialect = PgLike;
        let columns = vec![ColumnMeta::new("id"), ColumnMeta::new("name").with_sql_type("text")];
        let picks = vec![0, 1];
        let mut builder = BatchBuilder::new(&dialect, "\"t\"".to_string(), &columns, &picks, true);
        builder.push_insert_prefix();
        builder.set_header();

        builder.push_str(" SELECT ");
        builder.push_row_values(&row(1, "a"), CastMode::All).unwrap();

        assert!(builder.sql().ends_with("SELECT $1,CAST($2 AS text)"));
    }

    #[test]
    fn test_rollback_is_identity_on_text_params_and_count() {
        let dialect = PgLike;
        let columns = make_columns();
        let picks = vec![0, 1];
        let mut builder = make_builder(&dialect, &columns, &picks, true);

        builder.mark_row();
        builder.push_str("(");
        builder.push_row_values(&row(1, "a"), CastMode::Never).unwrap();
        builder.push_str("),");

        let sql_before = builder.sql().to_string();
        let params_before = builder.param_count();
        let rows_before = builder.row_count();

        builder.mark_row();
        builder.push_str("(");
        builder.push_row_values(&row(2, "b"), CastMode::Never).unwrap();
        builder.push_str("),");
        builder.rollback_row();

        assert_eq!(builder.sql(), sql_before);
        assert_eq!(builder.param_count(), params_before);
        assert_eq!(builder.row_count(), rows_before);
    }

    #[test]
    fn test_reset_restores_header_only_state() {
        let dialect = PgLike;
        let columns = make_columns();
        let picks = vec![0, 1];
        let mut builder = make_builder(&dialect, &columns, &picks, true);
        let header = builder.sql().to_string();

        builder.mark_row();
        builder.push_str("(");
        builder.push_row_values(&row(1, "a"), CastMode::Never).unwrap();
        builder.push_str("),");
        builder.reset();

        assert_eq!(builder.sql(), header);
        assert_eq!(builder.param_count(), 0);
        assert_eq!(builder.row_count(), 0);
    }

    #[test]
    fn test_arity_mismatch_is_a_render_error() {
        let dialect = PgLike;
        let columns = make_columns();
        let picks = vec![0, 1];
        let mut builder = make_builder(&dialect, &columns, &picks, false);

        let short = vec![SqlValue::from(1i32)];
        let err = builder.push_row_values(&short, CastMode::Never).unwrap_err();
        assert!(err.to_string().contains("Render error"));
    }

    #[test]
    fn test_skipped_column_values_are_ignored() {
        let dialect = PgLike;
        let columns = vec![
            ColumnMeta::new("id").identity(),
            ColumnMeta::new("name").with_sql_type("text"),
        ];
        let picks = vec![1];
        let mut builder = BatchBuilder::new(&dialect, "\"t\"".to_string(), &columns, &picks, false);
        builder.push_insert_prefix();
        builder.push_str(" VALUES ");
        builder.set_header();

        builder.push_str("(");
        builder.push_row_values(&row(7, "kept"), CastMode::Never).unwrap();
        builder.push_str("),");

        assert_eq!(
            builder.sql(),
            "INSERT INTO \"t\" (\"name\") VALUES ('kept'),"
        );
    }
}
