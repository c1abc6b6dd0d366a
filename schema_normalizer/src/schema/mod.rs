//! Schema module
//!
//! Canonical schema model, column and relation normalization, and the
//! analyzer that assembles them from a database adapter.

pub mod analyzer;
pub mod columns;
pub mod normalizer;
pub mod relations;
pub mod types;

// Re-export key types
pub use analyzer::SchemaAnalyzer;
pub use columns::ColumnNormalizer;
pub use normalizer::normalize_relations;
pub use relations::RelationResolver;
pub use types::{Column, ColumnType, DataType, Relation, Schema, Table, TableReference};
