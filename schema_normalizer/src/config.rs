//! Configuration handling
//!
//! Connection parameters are always passed explicitly; there is no
//! process-wide default connection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;

use crate::error::{Error, Result};

/// Tables that are never part of a schema, whatever the engine.
pub const BUILTIN_EXCLUDED_TABLES: &[&str] = &["pg_stat_statements"];

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    parse(&config_str)
}

/// Parse configuration from a TOML string
pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    if config.database.database.is_empty() {
        return Err(Error::ConfigError("Database not provided".to_string()));
    }

    Ok(config)
}

/// Represents the complete configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub introspection: IntrospectionConfig,
    pub logging: Option<LoggingConfig>,
}

/// Supported database engines
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[serde(alias = "postgresql")]
    Postgres,
    MySql,
}

impl Engine {
    pub fn default_port(self) -> u16 {
        match self {
            Engine::Postgres => 5432,
            Engine::MySql => 3306,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Postgres => write!(f, "postgres"),
            Engine::MySql => write!(f, "mysql"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub engine: Engine,
    #[serde(default = "default_host")]
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// Namespace to introspect. PostgreSQL defaults to `public`, MySQL to the database itself.
    pub schema: Option<String>,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl DatabaseConfig {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }

    pub fn schema(&self) -> &str {
        match (&self.schema, self.engine) {
            (Some(schema), _) => schema.as_str(),
            (None, Engine::Postgres) => "public",
            (None, Engine::MySql) => self.database.as_str(),
        }
    }
}

/// Table discovery settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct IntrospectionConfig {
    #[serde(default)]
    pub exclude_tables: Vec<String>,
}

impl IntrospectionConfig {
    /// Whether a table is filtered out at discovery time
    pub fn is_excluded(&self, table: &str) -> bool {
        BUILTIN_EXCLUDED_TABLES.contains(&table) || self.exclude_tables.iter().any(|t| t == table)
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}
