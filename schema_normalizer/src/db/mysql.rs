//! MySQL adapter

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{FromRow, MySqlPool};

use crate::config::Engine;
use crate::db::source::{EnumCatalog, RawColumn, SchemaSource};
use crate::error::{Error, Result};
use crate::schema::types::TableReference;

static ENUM_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'((?:[^']|'')*)'").expect("enum label pattern is valid")
});

#[derive(FromRow)]
struct TableRow {
    table_name: String,
}

#[derive(FromRow)]
struct ColumnRow {
    column_name: String,
    is_nullable: String,
    data_type: String,
    character_maximum_length: Option<i64>,
    column_type: String,
    constraint_type: Option<String>,
}

#[derive(FromRow)]
struct ReferenceRow {
    column_name: String,
    referenced_table_name: String,
    referenced_column_name: String,
}

#[derive(FromRow)]
struct EnumTypeRow {
    column_type: String,
}

/// Labels of an `enum('a','b')` column type literal, in declaration order
pub fn parse_enum_literal(column_type: &str) -> Option<Vec<String>> {
    let trimmed = column_type.trim();
    let body = trimmed
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("enum("))
        .and_then(|_| trimmed[5..].strip_suffix(')'))?;

    let labels: Vec<String> = ENUM_LABEL
        .captures_iter(body)
        .map(|caps| caps[1].replace("''", "'"))
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}

/// Reads metadata from `information_schema` of one database.
///
/// Enum columns use their full `COLUMN_TYPE` literal as the catalog key.
#[derive(Debug, Clone)]
pub struct MySqlSource {
    pool: MySqlPool,
    schema: String,
}

impl MySqlSource {
    pub fn new(pool: MySqlPool, schema: &str) -> Self {
        Self {
            pool,
            schema: schema.to_string(),
        }
    }
}

#[async_trait]
impl SchemaSource for MySqlSource {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let sql = r#"
            SELECT CAST(TABLE_NAME AS CHAR) AS table_name
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows = sqlx::query_as::<_, TableRow>(sql)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.table_name).collect())
    }

    async fn fetch_columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        let sql = r#"
            SELECT
                CAST(c.COLUMN_NAME AS CHAR) AS column_name,
                CAST(c.IS_NULLABLE AS CHAR) AS is_nullable,
                CAST(c.DATA_TYPE AS CHAR) AS data_type,
                CAST(c.CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS character_maximum_length,
                CAST(c.COLUMN_TYPE AS CHAR) AS column_type,
                CAST(tc.CONSTRAINT_TYPE AS CHAR) AS constraint_type
            FROM information_schema.COLUMNS c
            LEFT JOIN information_schema.KEY_COLUMN_USAGE kcu
                ON kcu.TABLE_SCHEMA = c.TABLE_SCHEMA
                AND kcu.TABLE_NAME = c.TABLE_NAME
                AND kcu.COLUMN_NAME = c.COLUMN_NAME
            LEFT JOIN information_schema.TABLE_CONSTRAINTS tc
                ON tc.CONSTRAINT_SCHEMA = kcu.CONSTRAINT_SCHEMA
                AND tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
                AND tc.TABLE_NAME = c.TABLE_NAME
            WHERE c.TABLE_SCHEMA = ? AND c.TABLE_NAME = ?
            ORDER BY c.ORDINAL_POSITION
        "#;

        let rows = sqlx::query_as::<_, ColumnRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::query(table, e))?;

        Ok(rows
            .into_iter()
            .map(|row| RawColumn {
                column_name: row.column_name,
                is_nullable: row.is_nullable,
                data_type: row.data_type,
                character_maximum_length: row.character_maximum_length,
                constraint_type: row.constraint_type,
                type_name: Some(row.column_type),
            })
            .collect())
    }

    async fn fetch_relations(&self, table: &str) -> Result<Vec<TableReference>> {
        let sql = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR) AS column_name,
                CAST(REFERENCED_TABLE_NAME AS CHAR) AS referenced_table_name,
                CAST(REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column_name
            FROM information_schema.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = ?
                AND TABLE_NAME = ?
                AND REFERENCED_TABLE_NAME IS NOT NULL
            ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION
        "#;

        let rows = sqlx::query_as::<_, ReferenceRow>(sql)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::query(table, e))?;

        Ok(rows
            .into_iter()
            .map(|row| TableReference {
                name: row.column_name,
                table: row.referenced_table_name,
                column: row.referenced_column_name,
            })
            .collect())
    }

    async fn fetch_enum_catalog(&self) -> Result<EnumCatalog> {
        let sql = r#"
            SELECT DISTINCT CAST(COLUMN_TYPE AS CHAR) AS column_type
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = ? AND DATA_TYPE = 'enum'
        "#;

        let rows = sqlx::query_as::<_, EnumTypeRow>(sql)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let labels = parse_enum_literal(&row.column_type)?;
                Some((row.column_type, labels))
            })
            .collect())
    }
}
