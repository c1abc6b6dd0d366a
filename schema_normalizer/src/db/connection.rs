//! Database connection handling
//!
//! Pools are built from explicit connection parameters; no URL is assembled
//! from user input.

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    postgres::{PgConnectOptions, PgPoolOptions},
    MySql, Pool, Postgres,
};
use std::time::Duration;

use crate::config::{DatabaseConfig, Engine};
use crate::error::{Error, Result};

/// Enumeration of supported database pools
#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    Postgres(Pool<Postgres>),
    MySql(Pool<MySql>),
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool_size = config.pool_size.unwrap_or(10);
        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(30));

        tracing::debug!(
            engine = %config.engine,
            host = %config.host,
            port = config.port(),
            database = %config.database,
            "Connecting"
        );

        match config.engine {
            Engine::Postgres => {
                let mut options = PgConnectOptions::new()
                    .host(&config.host)
                    .port(config.port())
                    .username(&config.user)
                    .database(&config.database);
                if let Some(password) = &config.password {
                    options = options.password(password);
                }

                let pool = PgPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect_with(options)
                    .await
                    .map_err(|e| Error::ConnectionError(e.to_string()))?;

                Ok(DatabaseConnection::Postgres(pool))
            }
            Engine::MySql => {
                let mut options = MySqlConnectOptions::new()
                    .host(&config.host)
                    .port(config.port())
                    .username(&config.user)
                    .database(&config.database);
                if let Some(password) = &config.password {
                    options = options.password(password);
                }

                let pool = MySqlPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect_with(options)
                    .await
                    .map_err(|e| Error::ConnectionError(e.to_string()))?;

                Ok(DatabaseConnection::MySql(pool))
            }
        }
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        match self {
            DatabaseConnection::Postgres(pool) => pool.close().await,
            DatabaseConnection::MySql(pool) => pool.close().await,
        }
    }
}
