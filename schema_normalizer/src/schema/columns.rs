//! Column normalization
//!
//! Turns raw, engine-specific column rows into canonical [`Column`] values.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::Engine;
use crate::db::source::{EnumCatalog, RawColumn};
use crate::error::SchemaWarning;
use crate::schema::types::{Column, ColumnType, DataType};

pub const PRIMARY_KEY: &str = "PRIMARY KEY";
pub const UNIQUE: &str = "UNIQUE";
pub const FOREIGN_KEY: &str = "FOREIGN KEY";

/// How a native type token is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
enum NativeType {
    Scalar(ColumnType),
    /// Scalar whose size comes from the max-length field
    Bounded(ColumnType),
    /// Labels must be resolved through the enum catalog
    Enum,
}

/// Keyed by `data_type` spellings, plus the `udt_name` spellings of types
/// that `information_schema` reports as `USER-DEFINED` (extensions such as
/// `citext`).
static POSTGRES_TYPES: Lazy<HashMap<&'static str, NativeType>> = Lazy::new(|| {
    use ColumnType::*;
    use NativeType::*;
    HashMap::from([
        ("character varying", Bounded(String)),
        ("varchar", Bounded(String)),
        ("character", Bounded(String)),
        ("char", Bounded(String)),
        ("bpchar", Scalar(String)),
        ("text", Scalar(String)),
        ("citext", Scalar(String)),
        ("uuid", Scalar(String)),
        ("name", Scalar(String)),
        ("smallint", Scalar(Number)),
        ("integer", Scalar(Number)),
        ("bigint", Scalar(Number)),
        ("int", Scalar(Number)),
        ("int2", Scalar(Number)),
        ("int4", Scalar(Number)),
        ("int8", Scalar(Number)),
        ("smallserial", Scalar(Number)),
        ("serial", Scalar(Number)),
        ("bigserial", Scalar(Number)),
        ("numeric", Scalar(Number)),
        ("decimal", Scalar(Number)),
        ("real", Scalar(Number)),
        ("double precision", Scalar(Number)),
        ("money", Scalar(Number)),
        ("boolean", Scalar(Boolean)),
        ("bool", Scalar(Boolean)),
        ("date", Scalar(Date)),
        ("timestamp", Scalar(Date)),
        ("timestamp without time zone", Scalar(Date)),
        ("timestamp with time zone", Scalar(Date)),
        ("timestamptz", Scalar(Date)),
        ("time", Scalar(Date)),
        ("time without time zone", Scalar(Date)),
        ("time with time zone", Scalar(Date)),
        ("user-defined", NativeType::Enum),
    ])
});

/// Keyed by `DATA_TYPE`. Booleans are reported as `tinyint` and are told apart
/// by their column type, see [`is_mysql_boolean`].
static MYSQL_TYPES: Lazy<HashMap<&'static str, NativeType>> = Lazy::new(|| {
    use ColumnType::*;
    use NativeType::*;
    HashMap::from([
        ("varchar", Bounded(String)),
        ("char", Bounded(String)),
        ("tinytext", Scalar(String)),
        ("text", Scalar(String)),
        ("mediumtext", Scalar(String)),
        ("longtext", Scalar(String)),
        ("tinyint", Scalar(Number)),
        ("smallint", Scalar(Number)),
        ("mediumint", Scalar(Number)),
        ("int", Scalar(Number)),
        ("integer", Scalar(Number)),
        ("bigint", Scalar(Number)),
        ("decimal", Scalar(Number)),
        ("numeric", Scalar(Number)),
        ("float", Scalar(Number)),
        ("double", Scalar(Number)),
        ("bit", Scalar(Boolean)),
        ("date", Scalar(Date)),
        ("datetime", Scalar(Date)),
        ("timestamp", Scalar(Date)),
        ("time", Scalar(Date)),
        ("year", Scalar(Date)),
        ("enum", NativeType::Enum),
    ])
});

fn lookup(engine: Engine, token: &str) -> Option<NativeType> {
    let token = token.trim().to_lowercase();
    let table = match engine {
        Engine::Postgres => &POSTGRES_TYPES,
        Engine::MySql => &MYSQL_TYPES,
    };
    table.get(token.as_str()).cloned()
}

/// `BOOL` and `BOOLEAN` are aliases of `tinyint(1)`
fn is_mysql_boolean(column_type: &str) -> bool {
    column_type
        .split_whitespace()
        .next()
        .is_some_and(|token| token.eq_ignore_ascii_case("tinyint(1)"))
}

/// Converts raw column rows of one engine into canonical columns
#[derive(Debug, Clone, Copy)]
pub struct ColumnNormalizer<'a> {
    engine: Engine,
    catalog: &'a EnumCatalog,
}

impl<'a> ColumnNormalizer<'a> {
    pub fn new(engine: Engine, catalog: &'a EnumCatalog) -> Self {
        Self { engine, catalog }
    }

    /// Normalize a single raw column, discarding warnings
    pub fn normalize(&self, raw: &RawColumn) -> Column {
        self.normalize_with_warnings(raw, &mut Vec::new())
    }

    /// Normalize a single raw column.
    ///
    /// Never fails: unmapped types and unresolvable enums degrade to
    /// `unknown` and push a warning instead.
    pub fn normalize_with_warnings(
        &self,
        raw: &RawColumn,
        warnings: &mut Vec<SchemaWarning>,
    ) -> Column {
        let constraint = raw.constraint_type.as_deref().map(str::trim);
        let primary = constraint.is_some_and(|c| c.eq_ignore_ascii_case(PRIMARY_KEY));
        let unique = primary || constraint.is_some_and(|c| c.eq_ignore_ascii_case(UNIQUE));

        Column {
            name: raw.column_name.clone(),
            allow_null: !primary && raw.is_nullable.trim().eq_ignore_ascii_case("YES"),
            primary,
            unique,
            foreign_key: false,
            data_type: self.data_type(raw, warnings),
            relation: None,
        }
    }

    /// Normalize all rows of one table, merging rows that describe the same
    /// physical column. Order of first appearance is kept.
    pub fn normalize_all(&self, rows: &[RawColumn], warnings: &mut Vec<SchemaWarning>) -> Vec<Column> {
        let mut columns: IndexMap<String, Column> = IndexMap::new();

        for raw in rows {
            let column = self.normalize_with_warnings(raw, warnings);
            match columns.get_mut(&column.name) {
                Some(existing) => {
                    existing.primary |= column.primary;
                    existing.unique |= column.unique;
                    existing.allow_null &= column.allow_null;
                    if existing.primary {
                        existing.allow_null = false;
                    }
                }
                None => {
                    columns.insert(column.name.clone(), column);
                }
            }
        }

        // Duplicate rows repeat type warnings too.
        warnings.dedup();

        columns.into_values().collect()
    }

    fn data_type(&self, raw: &RawColumn, warnings: &mut Vec<SchemaWarning>) -> DataType {
        match self.native_type(raw) {
            Some(NativeType::Scalar(kind)) => DataType::new(kind),
            Some(NativeType::Bounded(kind)) => match raw
                .character_maximum_length
                .and_then(|len| u32::try_from(len).ok())
            {
                Some(size) => DataType::sized(kind, size),
                None => DataType::new(kind),
            },
            Some(NativeType::Enum) => self.enum_type(raw, warnings),
            None => {
                warnings.push(SchemaWarning::UnmappedType {
                    column: raw.column_name.clone(),
                    native_type: raw.data_type.clone(),
                });
                DataType::new(ColumnType::Unknown)
            }
        }
    }

    /// Interpret the native type of a row, refined by the engine type name
    fn native_type(&self, raw: &RawColumn) -> Option<NativeType> {
        let type_name = raw.type_name.as_deref();

        match (self.engine, lookup(self.engine, &raw.data_type)) {
            (Engine::MySql, Some(NativeType::Scalar(ColumnType::Number)))
                if type_name.is_some_and(is_mysql_boolean) =>
            {
                Some(NativeType::Scalar(ColumnType::Boolean))
            }
            // Catalog labels win; otherwise the udt name may be a known scalar.
            (Engine::Postgres, Some(NativeType::Enum)) => match type_name {
                Some(name) if self.catalog.labels(name).is_none() => {
                    match lookup(Engine::Postgres, name) {
                        Some(NativeType::Enum) | None => Some(NativeType::Enum),
                        scalar => scalar,
                    }
                }
                _ => Some(NativeType::Enum),
            },
            (_, native) => native,
        }
    }

    fn enum_type(&self, raw: &RawColumn, warnings: &mut Vec<SchemaWarning>) -> DataType {
        let type_name = raw.type_name.as_deref().unwrap_or(&raw.data_type);

        match self.catalog.labels(type_name) {
            Some(labels) => DataType::enumeration(labels.to_vec()),
            None => {
                warnings.push(SchemaWarning::EnumResolution {
                    column: raw.column_name.clone(),
                    type_name: type_name.to_string(),
                });
                DataType::new(ColumnType::Unknown)
            }
        }
    }
}
