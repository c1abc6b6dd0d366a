//! Database module
//!
//! Connections and the per-engine metadata adapters.

pub mod connection;
pub mod mysql;
pub mod postgres;
pub mod source;

// Re-export key types
pub use connection::DatabaseConnection;
pub use mysql::MySqlSource;
pub use postgres::PostgresSource;
pub use source::{EnumCatalog, RawColumn, SchemaSource};
