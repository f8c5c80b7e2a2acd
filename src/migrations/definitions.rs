//! Core migration types

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, MigrateResult};

/// A discovered migration script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFile {
    /// Version extracted from the filename
    pub version: u64,
    /// Lowercased basename; the natural key in the migration log
    pub name: String,
    /// Location of the script on disk
    pub path: PathBuf,
}

impl MigrationFile {
    /// Read the raw SQL body of the script
    ///
    /// Contents are read when a migration is actually applied, so an
    /// unreadable file fails the run at that migration rather than at
    /// discovery.
    pub fn read_contents(&self) -> MigrateResult<String> {
        fs::read_to_string(&self.path).map_err(|source| MigrateError::IoFailure {
            name: self.name.clone(),
            source,
        })
    }
}

/// A row of the `migration_log` tracking table
///
/// Rows are inserted inside the applying transaction and never updated or
/// deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MigrationRecord {
    pub id: i64,
    pub name: String,
    /// Epoch milliseconds at the time the migration was recorded
    pub created_at: i64,
}

/// Result of a successful migration run
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Names of migrations applied by this run, in execution order
    pub applied: Vec<String>,
    /// Number of migrations skipped because they were already recorded
    pub skipped: usize,
    /// Total run time in milliseconds
    pub execution_time_ms: u128,
}

/// Whether a discovered migration has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    Pending,
    Applied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_contents_of_missing_file_is_io_failure() {
        let file = MigrationFile {
            version: 1,
            name: "v1__gone.sql".to_string(),
            path: PathBuf::from("/nonexistent/V1__gone.sql"),
        };

        let err = file.read_contents().unwrap_err();
        match err {
            MigrateError::IoFailure { name, .. } => assert_eq!(name, "v1__gone.sql"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
