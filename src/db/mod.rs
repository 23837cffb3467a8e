//! Database module providing connection management, migrations, and queries.

pub mod github_users;
pub mod scores;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Shared database handle.
///
/// Wraps the SeaORM connection pool; cloning is cheap and every clone shares
/// the same pool.
#[derive(Clone, Debug)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        Self::connect(&config.database_url, config.db_max_connections).await
    }

    /// Connect to the given URL with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let mut opts = ConnectOptions::new(database_url.to_owned());
        opts.max_connections(max_connections.max(1))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Apply all pending migrations. Safe to call on every startup.
    pub async fn run_migrations(&self) -> AppResult<()> {
        let pending = Migrator::get_pending_migrations(&self.conn).await?;
        if pending.is_empty() {
            info!("No pending migrations");
            return Ok(());
        }

        info!("{} migration(s) pending", pending.len());
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        info!("Database migrations complete");

        Ok(())
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Whether a database error is a unique constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
