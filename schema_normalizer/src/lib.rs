//! schema_normalizer: reads a relational database schema and normalizes it
//!
//! Raw engine metadata (column rows, constraint rows, foreign-key joins) is
//! turned into a database-agnostic [`Schema`] of tables, typed columns and
//! inferred one-to-one, many-to-one and many-to-many relations.

pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use config::{Config, Engine};
pub use db::connection::DatabaseConnection;
pub use db::source::{EnumCatalog, RawColumn, SchemaSource};
pub use error::{Error, Result, SchemaWarning};
pub use schema::analyzer::SchemaAnalyzer;
pub use schema::normalizer::normalize_relations;
pub use schema::types::{Column, ColumnType, DataType, Relation, Schema, Table, TableReference};

use db::{MySqlSource, PostgresSource};

/// Connect using the specified configuration file
pub async fn init(config_path: &str) -> Result<IntrospectionClient> {
    let config = config::load_from_file(config_path)?;
    IntrospectionClient::new(config).await
}

/// The main client: one connection pool, one configured namespace
pub struct IntrospectionClient {
    config: Config,
    db_connection: DatabaseConnection,
}

impl IntrospectionClient {
    /// Create a new client from configuration
    pub async fn new(config: Config) -> Result<Self> {
        let db_connection = DatabaseConnection::connect(&config.database).await?;

        Ok(Self {
            config,
            db_connection,
        })
    }

    /// Read the normalized schema of the configured database
    pub async fn read_schema(&self) -> Result<Schema> {
        let namespace = self.config.database.schema();
        let introspection = self.config.introspection.clone();

        match &self.db_connection {
            DatabaseConnection::Postgres(pool) => {
                SchemaAnalyzer::new(PostgresSource::new(pool.clone(), namespace), introspection)
                    .read_schema()
                    .await
            }
            DatabaseConnection::MySql(pool) => {
                SchemaAnalyzer::new(MySqlSource::new(pool.clone(), namespace), introspection)
                    .read_schema()
                    .await
            }
        }
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.db_connection.close().await;
    }
}
