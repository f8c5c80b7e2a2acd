//! Migration discovery, tracking, and execution

pub mod definitions;
pub mod log;
pub mod manager;
pub mod runner;

pub use definitions::{MigrationFile, MigrationRecord, MigrationReport, MigrationStatus};
pub use log::{MigrationLog, MIGRATION_LOG_TABLE};
pub use manager::make_execution_list;
pub use runner::{Migrator, MigratorBuilder};
