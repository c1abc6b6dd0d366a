//! The adapter interface every database engine implements
//!
//! Adapters only shape engine-specific metadata rows into [`RawColumn`] and
//! [`TableReference`] values. Normalization never looks past this boundary.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::config::Engine;
use crate::error::Result;
use crate::schema::types::TableReference;

/// One column row as returned by an engine's metadata query.
///
/// A column constrained several times (e.g. primary key and foreign key)
/// appears once per constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawColumn {
    pub column_name: String,
    /// `YES` or `NO`
    pub is_nullable: String,
    /// Native type token, e.g. `character varying` or `USER-DEFINED`
    pub data_type: String,
    pub character_maximum_length: Option<i64>,
    /// `PRIMARY KEY`, `UNIQUE`, `FOREIGN KEY` or absent
    pub constraint_type: Option<String>,
    /// Engine type name: `udt_name` on PostgreSQL, the full `COLUMN_TYPE` on
    /// MySQL. Keys the enum catalog and refines the native type.
    pub type_name: Option<String>,
}

impl RawColumn {
    pub fn new(column_name: &str, data_type: &str) -> Self {
        Self {
            column_name: column_name.to_string(),
            is_nullable: "YES".to_string(),
            data_type: data_type.to_string(),
            ..Default::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = "NO".to_string();
        self
    }

    pub fn max_length(mut self, length: i64) -> Self {
        self.character_maximum_length = Some(length);
        self
    }

    pub fn constraint(mut self, constraint_type: &str) -> Self {
        self.constraint_type = Some(constraint_type.to_string());
        self
    }

    pub fn type_name(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }
}

/// Enum type name -> labels, in the order the engine defines them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumCatalog {
    types: IndexMap<String, Vec<String>>,
}

impl EnumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one label to a type, keeping arrival order
    pub fn push_label(&mut self, type_name: &str, label: String) {
        self.types
            .entry(type_name.to_string())
            .or_default()
            .push(label);
    }

    /// Labels for a type. `None` when the type is unknown or has no labels.
    pub fn labels(&self, type_name: &str) -> Option<&[String]> {
        self.types
            .get(type_name)
            .map(Vec::as_slice)
            .filter(|labels| !labels.is_empty())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for EnumCatalog {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Metadata access for one database engine.
///
/// Implementations must tolerate concurrent calls for different tables.
/// Errors should carry the table they relate to (`Error::QueryError`).
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Engine whose type vocabulary the raw rows use
    fn engine(&self) -> Engine;

    /// Names of all base tables in the introspected namespace
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column rows of a table, in ordinal order
    async fn fetch_columns(&self, table: &str) -> Result<Vec<RawColumn>>;

    /// Foreign-key rows of a table
    async fn fetch_relations(&self, table: &str) -> Result<Vec<TableReference>>;

    /// All enum types of the introspected namespace
    async fn fetch_enum_catalog(&self) -> Result<EnumCatalog>;
}
