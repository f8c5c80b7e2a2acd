//! Database dialect abstractions
//!
//! A dialect produces the four statements the migration log needs for one
//! database family. Dialects only *produce* statements; executing them is
//! the caller's responsibility. No dialect holds connection state.

pub mod postgres;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{MigrateError, MigrateResult};

pub use postgres::PostgresDialect;

/// A produced, not yet executed, SQL statement with its bound parameters
///
/// Dynamic values travel as parameters, never interpolated into the SQL
/// text.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter, positionally matching the next placeholder
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Typed parameter values for statement binding
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    BigInt(i64),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::BigInt(value)
    }
}

/// SQL generation strategy for one database family
///
/// Adding a database family means adding an implementation and a registry
/// entry; the runner never changes.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Statement returning a single boolean column named `exists`, true iff
    /// the named table is present
    fn check_table_exists(&self, table_name: &str) -> SqlStatement;

    /// DDL for the migration tracking table: surrogate primary key, unique
    /// non-null `name`, non-null integer epoch-millis `created_at`
    fn create_migration_table(&self) -> SqlStatement;

    /// Statement returning a single boolean column named `exists`, true iff
    /// a row with the given migration name is recorded
    fn check_migration_exists(&self, migration_name: &str) -> SqlStatement;

    /// Insert recording the named migration with the current wall-clock
    /// epoch-millis
    fn insert_confirm_statement(&self, migration_name: &str) -> SqlStatement;
}

/// Process-wide dialect registry, built once and never mutated
static DIALECTS: Lazy<HashMap<&'static str, &'static dyn Dialect>> = Lazy::new(|| {
    let mut dialects: HashMap<&'static str, &'static dyn Dialect> = HashMap::new();
    dialects.insert("postgresql", &PostgresDialect);
    dialects.insert("postgres", &PostgresDialect);
    dialects
});

/// Resolve the dialect for a driver identifier
pub fn resolve(driver: &str) -> MigrateResult<&'static dyn Dialect> {
    DIALECTS
        .get(driver)
        .copied()
        .ok_or_else(|| MigrateError::UnsupportedDialect {
            driver: driver.to_string(),
        })
}
