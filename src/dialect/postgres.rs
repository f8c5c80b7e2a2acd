//! PostgreSQL dialect
//!
//! Generates the tracking-table statements for the PostgreSQL family. The
//! existence probe goes through `pg_tables` and only considers the `public`
//! schema.

use chrono::Utc;

use super::{Dialect, SqlStatement};

/// PostgreSQL-family dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn check_table_exists(&self, table_name: &str) -> SqlStatement {
        SqlStatement::new(
            "SELECT EXISTS (SELECT FROM pg_tables WHERE schemaname = 'public' AND tablename = $1) AS \"exists\"",
        )
        .bind(table_name)
    }

    fn create_migration_table(&self) -> SqlStatement {
        SqlStatement::new(
            "CREATE TABLE migration_log (\n    \
                id BIGSERIAL PRIMARY KEY,\n    \
                name VARCHAR(255) NOT NULL UNIQUE,\n    \
                created_at BIGINT NOT NULL\n\
            )",
        )
    }

    fn check_migration_exists(&self, migration_name: &str) -> SqlStatement {
        SqlStatement::new(
            "SELECT EXISTS (SELECT name FROM migration_log WHERE name = $1) AS \"exists\"",
        )
        .bind(migration_name)
    }

    fn insert_confirm_statement(&self, migration_name: &str) -> SqlStatement {
        SqlStatement::new("INSERT INTO migration_log (created_at, name) VALUES ($1, $2)")
            .bind(Utc::now().timestamp_millis())
            .bind(migration_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlValue;

    #[test]
    fn table_probe_binds_table_name() {
        let statement = PostgresDialect.check_table_exists("migration_log");

        assert!(statement.sql.contains("pg_tables"));
        assert!(statement.sql.contains("$1"));
        assert_eq!(
            statement.params,
            vec![SqlValue::Text("migration_log".to_string())]
        );
    }

    #[test]
    fn tracking_table_ddl_has_expected_columns() {
        let statement = PostgresDialect.create_migration_table();

        assert!(statement.sql.contains("CREATE TABLE migration_log"));
        assert!(statement.sql.contains("id BIGSERIAL PRIMARY KEY"));
        assert!(statement.sql.contains("name VARCHAR(255) NOT NULL UNIQUE"));
        assert!(statement.sql.contains("created_at BIGINT NOT NULL"));
        assert!(statement.params.is_empty());
    }

    #[test]
    fn applied_check_binds_migration_name() {
        let statement = PostgresDialect.check_migration_exists("v1__init.sql");

        assert!(statement.sql.contains("WHERE name = $1"));
        // the name must never be spliced into the SQL text
        assert!(!statement.sql.contains("v1__init.sql"));
        assert_eq!(
            statement.params,
            vec![SqlValue::Text("v1__init.sql".to_string())]
        );
    }

    #[test]
    fn confirm_insert_binds_timestamp_then_name() {
        let before = Utc::now().timestamp_millis();
        let statement = PostgresDialect.insert_confirm_statement("v1__init.sql");
        let after = Utc::now().timestamp_millis();

        assert!(statement.sql.contains("INSERT INTO migration_log"));
        assert_eq!(statement.params.len(), 2);
        match &statement.params[0] {
            SqlValue::BigInt(millis) => assert!((before..=after).contains(millis)),
            other => panic!("expected epoch millis, got {other:?}"),
        }
        assert_eq!(
            statement.params[1],
            SqlValue::Text("v1__init.sql".to_string())
        );
    }
}
