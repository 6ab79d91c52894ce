//! Statement shape strategies.
//!
//! Each strategy is a stateless prepare/add/finish triplet writing through
//! the shared [`BatchBuilder`]; which one runs is decided once per
//! invocation from the dialect's multi-row shape. Rows always append a
//! trailing separator and `finish` trims it, so rolling a row back never
//! leaves a dangling separator behind.

use crate::core::traits::{Dialect, MultiRowShape};
use crate::core::value::SqlValue;
use crate::error::Result;

use super::builder::{BatchBuilder, CastMode};

const UNION_ALL_TAIL: &str = " UNION ALL";

/// One statement shape: how a batch opens, how a row lands in it, and how
/// it closes.
pub(crate) trait RowStrategy: Send + Sync {
    /// Emit the invariant statement header and record it on the builder.
    fn prepare(&self, builder: &mut BatchBuilder<'_>);

    /// Append one row in this strategy's shape, with its trailing separator.
    fn add(&self, builder: &mut BatchBuilder<'_>, row: &[SqlValue<'_>]) -> Result<()>;

    /// Trim the trailing separator and close the statement.
    fn finish(&self, builder: &mut BatchBuilder<'_>);
}

/// Pick the strategy for a dialect's declared shape.
pub(crate) fn select_strategy(shape: MultiRowShape) -> &'static dyn RowStrategy {
    match shape {
        MultiRowShape::ValuesList => &ValuesList,
        MultiRowShape::UnionSelect => &UnionSelect,
        MultiRowShape::WrappedUnion => &WrappedUnion,
    }
}

fn union_cast_mode(dialect: &dyn Dialect) -> CastMode {
    if !dialect.cast_union_parameters() {
        CastMode::Never
    } else if dialect.cast_all_union_rows() {
        CastMode::All
    } else {
        CastMode::FirstRow
    }
}

fn union_add(builder: &mut BatchBuilder<'_>, row: &[SqlValue<'_>]) -> Result<()> {
    let dialect = builder.dialect();
    builder.push_str(" SELECT ");
    builder.push_row_values(row, union_cast_mode(dialect))?;
    if let Some(from) = dialect.union_from_clause() {
        builder.push_str(" ");
        builder.push_str(from);
    }
    builder.push_str(UNION_ALL_TAIL);
    Ok(())
}

/// `INSERT INTO t (cols) VALUES (r1),(r2),...`
pub(crate) struct ValuesList;

impl RowStrategy for ValuesList {
    fn prepare(&self, builder: &mut BatchBuilder<'_>) {
        builder.push_insert_prefix();
        builder.push_str(" VALUES ");
        builder.set_header();
    }

    fn add(&self, builder: &mut BatchBuilder<'_>, row: &[SqlValue<'_>]) -> Result<()> {
        builder.push_str("(");
        builder.push_row_values(row, CastMode::Never)?;
        builder.push_str("),");
        Ok(())
    }

    fn finish(&self, builder: &mut BatchBuilder<'_>) {
        builder.trim_tail(1);
    }
}

/// `INSERT INTO t (cols) SELECT v1,v2 <from> UNION ALL SELECT ...`
pub(crate) struct UnionSelect;

impl RowStrategy for UnionSelect {
    fn prepare(&self, builder: &mut BatchBuilder<'_>) {
        builder.push_insert_prefix();
        builder.set_header();
    }

    fn add(&self, builder: &mut BatchBuilder<'_>, row: &[SqlValue<'_>]) -> Result<()> {
        union_add(builder, row)
    }

    fn finish(&self, builder: &mut BatchBuilder<'_>) {
        builder.trim_tail(UNION_ALL_TAIL.len());
    }
}

/// `INSERT INTO t (cols) SELECT * FROM ( SELECT ... UNION ALL ... )`
pub(crate) struct WrappedUnion;

impl RowStrategy for WrappedUnion {
    fn prepare(&self, builder: &mut BatchBuilder<'_>) {
        builder.push_insert_prefix();
        builder.push_str(" SELECT * FROM (");
        builder.set_header();
    }

    fn add(&self, builder: &mut BatchBuilder<'_>, row: &[SqlValue<'_>]) -> Result<()> {
        union_add(builder, row)
    }

    fn finish(&self, builder: &mut BatchBuilder<'_>) {
        builder.trim_tail(UNION_ALL_TAIL.len());
        builder.push_str(" )");
    }
}
