//! Migration log gateway
//!
//! Executes dialect-produced statements against the live connection to
//! maintain the tracking table. All answers about prior state come from the
//! durable table, never from an in-memory journal, so a re-run after a
//! failure resumes from the first unapplied migration.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgConnection, Postgres, Row};

use crate::dialect::{Dialect, SqlStatement, SqlValue};

/// Name of the tracking table
pub const MIGRATION_LOG_TABLE: &str = "migration_log";

/// Gateway over the migration tracking table
#[derive(Debug)]
pub struct MigrationLog {
    dialect: &'static dyn Dialect,
}

impl MigrationLog {
    pub fn new(dialect: &'static dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Create the tracking table when it does not exist yet
    ///
    /// Idempotent; safe to call on every run.
    pub async fn ensure_log_table(&self, conn: &mut PgConnection) -> sqlx::Result<()> {
        let probe = self.dialect.check_table_exists(MIGRATION_LOG_TABLE);
        if !fetch_exists(conn, &probe).await? {
            let ddl = self.dialect.create_migration_table();
            bind_statement(&ddl).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Whether the named migration is already recorded
    ///
    /// An absent row or SQL NULL reads as `false`; the lack of a definitive
    /// answer is not an error here.
    pub async fn is_applied(&self, conn: &mut PgConnection, name: &str) -> sqlx::Result<bool> {
        let check = self.dialect.check_migration_exists(name);
        fetch_exists(conn, &check).await
    }

    /// Record the named migration as applied
    ///
    /// Callers must invoke this on the same transaction as the migration
    /// body, so a failed body and a confirm row can never both persist.
    pub async fn record_applied(&self, conn: &mut PgConnection, name: &str) -> sqlx::Result<()> {
        let confirm = self.dialect.insert_confirm_statement(name);
        bind_statement(&confirm).execute(conn).await?;
        Ok(())
    }
}

async fn fetch_exists(conn: &mut PgConnection, statement: &SqlStatement) -> sqlx::Result<bool> {
    let row = bind_statement(statement).fetch_optional(conn).await?;
    match row {
        Some(row) => Ok(row.try_get::<Option<bool>, _>("exists")?.unwrap_or(false)),
        None => Ok(false),
    }
}

/// Bind a produced statement's parameters onto a sqlx query
fn bind_statement(statement: &SqlStatement) -> Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&statement.sql);
    for param in &statement.params {
        query = match param {
            SqlValue::Text(value) => query.bind(value),
            SqlValue::BigInt(value) => query.bind(*value),
        };
    }
    query
}
