//! Error types for schema introspection

use thiserror::Error;

/// Result type for introspection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Any of these aborts the enclosing schema read.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error on table `{table}`: {source}")]
    QueryError {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Attach the table whose metadata query failed
    pub fn query(table: &str, source: sqlx::Error) -> Self {
        Error::QueryError {
            table: table.to_string(),
            source,
        }
    }
}

/// Non-fatal conditions absorbed into the model as `unknown` types.
///
/// These are collected while normalizing columns and logged by the caller;
/// they never abort a schema read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    #[error("column `{column}` has unmapped native type `{native_type}`")]
    UnmappedType { column: String, native_type: String },

    #[error("column `{column}`: no enum labels found for type `{type_name}`")]
    EnumResolution { column: String, type_name: String },

    #[error("enum catalog unavailable: {0}")]
    EnumCatalogUnavailable(String),
}
