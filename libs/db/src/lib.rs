//! Database plumbing shared by the server binary: connecting a SeaORM
//! `DatabaseConnection` from config and applying every module's migrations
//! with bounded retries.
//!
//! All modules share one database; each module's migrator tracks its own
//! history under a distinct migration table name, so migrators never step
//! on each other.

use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

/// Connection settings, mapped from the server's `database:` config block.
#[derive(Debug, Clone)]
pub struct ConnectOpts {
    pub url: String,
    pub max_conns: u32,
    pub busy_timeout_ms: Option<u32>,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_conns: 10,
            busy_timeout_ms: Some(5000),
        }
    }
}

/// Open a pooled connection. For SQLite the busy timeout is applied as a
/// pragma right after connecting.
pub async fn connect(opts: &ConnectOpts) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(opts.url.clone());
    options.max_connections(opts.max_conns);
    options.sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .context("failed to connect to database")?;

    if db.get_database_backend() == DbBackend::Sqlite {
        if let Some(ms) = opts.busy_timeout_ms {
            db.execute(Statement::from_string(
                DbBackend::Sqlite,
                format!("PRAGMA busy_timeout = {ms}"),
            ))
            .await
            .context("failed to set sqlite busy_timeout")?;
        }
    }

    Ok(db)
}

/// Applies a module's migrations, retrying transient failures a bounded
/// number of times with linear backoff. Exhausting the attempts returns an
/// error; the caller is expected to abort startup on it.
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    attempts: u32,
    backoff: Duration,
}

impl Default for MigrationRunner {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl MigrationRunner {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub async fn run<M: MigratorTrait>(
        &self,
        db: &DatabaseConnection,
        module: &str,
    ) -> Result<()> {
        let mut attempt: u32 = 1;
        loop {
            match M::up(db, None).await {
                Ok(()) => {
                    info!(module, "migrations applied");
                    return Ok(());
                }
                Err(e) if attempt < self.attempts => {
                    warn!(module, attempt, error = %e, "migration attempt failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(module, attempt, error = %e, "migrations failed, giving up");
                    return Err(e).with_context(|| {
                        format!("migrations for module '{module}' failed after {attempt} attempts")
                    });
                }
            }
        }
    }
}
