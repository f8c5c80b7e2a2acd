//! Error types for the migration engine
//!
//! Every failure aborts the run; nothing is retried internally. Each variant
//! carries enough context (file name, driver id, or underlying cause) to
//! diagnose without re-running.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Error types for migration operations
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Malformed connection URL, non-directory resource path, or missing
    /// builder input
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The migration resource root does not exist
    #[error("Couldn't find resource path: {}", path.display())]
    NotFound { path: PathBuf },

    /// A migration filename does not follow the version pattern
    #[error("{name} should be in format V<version>__<description>.sql")]
    InvalidMigrationName { name: String },

    /// Two migration files carry the same version number
    #[error("Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: u64,
        first: String,
        second: String,
    },

    /// No dialect registered for the driver identifier
    #[error("No dialect for driver '{driver}'")]
    UnsupportedDialect { driver: String },

    /// A migration script or the resource tree could not be read
    #[error("Couldn't read {name}")]
    IoFailure {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A migration's SQL body or surrounding transaction failed
    #[error("Migration {name} failed")]
    ExecutionFailure {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    /// Connection establishment or a tracking-table round trip failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
