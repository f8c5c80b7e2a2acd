//! Migration runner
//!
//! Orchestrates a run: ensure the tracking table, discover and order the
//! scripts, then skip-or-apply each one inside its own transaction,
//! stopping at the first failure. Schema migrations are not safe to retry
//! blindly, so nothing is retried; fixing the failed script and re-running
//! resumes from the first unapplied migration.

use std::path::PathBuf;
use std::time::Instant;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::info;

use crate::config::ConnectionConfig;
use crate::dialect;
use crate::error::{MigrateError, MigrateResult};

use super::definitions::{MigrationFile, MigrationReport, MigrationStatus};
use super::log::MigrationLog;
use super::manager;

/// Applies versioned SQL scripts exactly once, in ascending version order
///
/// The migrator exclusively owns one database connection for the duration
/// of a run; every round trip is awaited before the next one is issued.
#[derive(Debug)]
pub struct Migrator {
    connection: PgConnection,
    log: MigrationLog,
    resource_path: PathBuf,
}

impl Migrator {
    /// Start building a migrator from a connection URL and credentials
    ///
    /// The URL must carry the `r2dbc:` scheme prefix. Empty credential
    /// strings are ignored; URL-embedded credentials then stand.
    pub fn builder(
        database_url: &str,
        username: &str,
        password: &str,
    ) -> MigrateResult<MigratorBuilder> {
        let config = ConnectionConfig::parse(database_url)?.with_credentials(username, password);
        Ok(MigratorBuilder {
            source: ConnectionSource::Url(config),
            resource_path: None,
        })
    }

    /// Run every pending migration, in ascending version order
    ///
    /// Already-recorded migrations are skipped; each remaining script and
    /// its confirm row are applied in one transaction. The first failure
    /// aborts the run with the failing migration's name attached.
    pub async fn migrate(&mut self) -> MigrateResult<MigrationReport> {
        info!("Start migrating...");
        let start = Instant::now();

        self.log.ensure_log_table(&mut self.connection).await?;

        let files = manager::make_execution_list(&self.resource_path)?;

        let mut report = MigrationReport::default();
        for file in &files {
            if self.log.is_applied(&mut self.connection, &file.name).await? {
                info!("Migration {} is already applied, skipping...", file.name);
                report.skipped += 1;
                continue;
            }

            self.apply(file).await?;
            info!("Applied migration: {}", file.name);
            report.applied.push(file.name.clone());
        }

        report.execution_time_ms = start.elapsed().as_millis();
        info!(
            "Migration finished successfully! ({} applied, {} skipped)",
            report.applied.len(),
            report.skipped
        );
        Ok(report)
    }

    /// Report each discovered migration with whether it has been applied,
    /// without applying anything
    pub async fn status(&mut self) -> MigrateResult<Vec<(MigrationFile, MigrationStatus)>> {
        self.log.ensure_log_table(&mut self.connection).await?;
        let files = manager::make_execution_list(&self.resource_path)?;

        let mut statuses = Vec::with_capacity(files.len());
        for file in files {
            let status = if self.log.is_applied(&mut self.connection, &file.name).await? {
                MigrationStatus::Applied
            } else {
                MigrationStatus::Pending
            };
            statuses.push((file, status));
        }
        Ok(statuses)
    }

    /// Cleanly close the underlying connection
    pub async fn close(self) -> MigrateResult<()> {
        self.connection.close().await?;
        Ok(())
    }

    /// Apply one migration: script body and confirm row in one transaction
    ///
    /// An early return drops the transaction uncommitted, which rolls it
    /// back; a failed body and a confirm row can never both persist.
    async fn apply(&mut self, file: &MigrationFile) -> MigrateResult<()> {
        let contents = file.read_contents()?;

        let mut tx = self
            .connection
            .begin()
            .await
            .map_err(|e| execution_failure(&file.name, e))?;

        sqlx::query(&contents)
            .execute(&mut *tx)
            .await
            .map_err(|e| execution_failure(&file.name, e))?;

        self.log
            .record_applied(&mut *tx, &file.name)
            .await
            .map_err(|e| execution_failure(&file.name, e))?;

        tx.commit()
            .await
            .map_err(|e| execution_failure(&file.name, e))?;

        Ok(())
    }
}

fn execution_failure(name: &str, source: sqlx::Error) -> MigrateError {
    MigrateError::ExecutionFailure {
        name: name.to_string(),
        source,
    }
}

#[derive(Debug)]
enum ConnectionSource {
    Url(ConnectionConfig),
    Options(PgConnectOptions),
}

/// Builder for [`Migrator`]
#[derive(Debug)]
pub struct MigratorBuilder {
    source: ConnectionSource,
    resource_path: Option<PathBuf>,
}

impl MigratorBuilder {
    /// Build from pre-built sqlx connect options instead of a URL
    pub fn from_options(options: PgConnectOptions) -> Self {
        Self {
            source: ConnectionSource::Options(options),
            resource_path: None,
        }
    }

    /// Directory containing the versioned SQL scripts
    pub fn resource_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    /// Resolve the dialect, then open the connection
    ///
    /// Dialect resolution happens before any connection work, so an
    /// unknown driver fails without touching the network.
    pub async fn build(self) -> MigrateResult<Migrator> {
        let resource_path = self.resource_path.ok_or_else(|| {
            MigrateError::InvalidConfig(
                "Resource path is required; call resource_path()".to_string(),
            )
        })?;

        let (dialect, options) = match self.source {
            ConnectionSource::Url(config) => {
                (dialect::resolve(&config.driver)?, config.connect_options())
            }
            // pre-built PgConnectOptions are PostgreSQL by construction
            ConnectionSource::Options(options) => (dialect::resolve("postgresql")?, options),
        };

        let connection = PgConnection::connect_with(&options).await?;

        Ok(Migrator {
            connection,
            log: MigrationLog::new(dialect),
            resource_path,
        })
    }
}
