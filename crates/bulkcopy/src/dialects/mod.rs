//! Shipped dialect profiles.
//!
//! Each dialect carries the SQL rendering rules and the capability profile
//! (statement shape, cast switches, hard limits) for one target engine.
//! Callers with an unlisted engine implement
//! [`Dialect`](crate::core::traits::Dialect) themselves; the trait defaults
//! cover portable ANSI behavior.

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
