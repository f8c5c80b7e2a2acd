//! # upward: forward-only SQL migrations for PostgreSQL
//!
//! Applies versioned SQL scripts (`V<version>__<description>.sql`) to a
//! database exactly once, in ascending version order, tracking applied
//! scripts in a `migration_log` table. Forward-only by design: there are no
//! down migrations; fixing a failed script and re-running resumes from the
//! first unapplied one.
//!
//! ```no_run
//! use upward::Migrator;
//!
//! # async fn run() -> upward::MigrateResult<()> {
//! let mut migrator =
//!     Migrator::builder("r2dbc:postgresql://localhost:5432/app", "app", "secret")?
//!         .resource_path("migrations")
//!         .build()
//!         .await?;
//!
//! let report = migrator.migrate().await?;
//! println!("applied {} migrations", report.applied.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod migrations;

pub use config::ConnectionConfig;
pub use dialect::{resolve, Dialect, PostgresDialect, SqlStatement, SqlValue};
pub use error::{MigrateError, MigrateResult};
pub use migrations::{
    MigrationFile, MigrationLog, MigrationRecord, MigrationReport, MigrationStatus, Migrator,
    MigratorBuilder, MIGRATION_LOG_TABLE,
};
