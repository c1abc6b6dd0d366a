//! PostgreSQL adapter

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::config::Engine;
use crate::db::source::{EnumCatalog, RawColumn, SchemaSource};
use crate::error::{Error, Result};
use crate::schema::types::TableReference;

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
    udt_name: Option<String>,
    constraint_type: Option<String>,
}

#[derive(FromRow)]
struct ReferenceRow {
    column_name: String,
    referenced_table_name: String,
    referenced_column_name: String,
}

#[derive(FromRow)]
struct EnumRow {
    type_name: String,
    label: String,
}

/// Reads metadata from `information_schema` and `pg_catalog` of one schema
#[derive(Debug, Clone)]
pub struct PostgresSource {
    pool: PgPool,
    schema: String,
}

impl PostgresSource {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        Self {
            pool,
            schema: schema.to_string(),
        }
    }
}

#[async_trait]
impl SchemaSource for PostgresSource {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let sql = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_type = 'BASE TABLE'
            ORDER BY table_name
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
                c.column_name::text AS column_name,
                c.is_nullable::text AS is_nullable,
                c.data_type::text AS data_type,
                c.character_maximum_length::bigint AS character_maximum_length,
                c.udt_name::text AS udt_name,
                tc.constraint_type::text AS constraint_type
            FROM information_schema.columns c
            LEFT JOIN information_schema.key_column_usage kcu
                ON kcu.table_schema = c.table_schema
                AND kcu.table_name = c.table_name
                AND kcu.column_name = c.column_name
            LEFT JOIN information_schema.table_constraints tc
                ON tc.constraint_schema = kcu.constraint_schema
                AND tc.constraint_name = kcu.constraint_name
                AND tc.table_name = c.table_name
            WHERE c.table_schema = $1 AND c.table_name = $2
            ORDER BY c.ordinal_position
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
                type_name: row.udt_name,
            })
            .collect())
    }

    async fn fetch_relations(&self, table: &str) -> Result<Vec<TableReference>> {
        let sql = r#"
            SELECT
                kcu.column_name::text AS column_name,
                ccu.table_name::text AS referenced_table_name,
                ccu.column_name::text AS referenced_column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
                ON ccu.constraint_name = tc.constraint_name
                AND ccu.constraint_schema = tc.constraint_schema
            WHERE tc.constraint_type = 'FOREIGN KEY'
                AND tc.table_schema = $1
                AND tc.table_name = $2
            ORDER BY tc.constraint_name, kcu.ordinal_position
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
            SELECT t.typname::text AS type_name, e.enumlabel::text AS label
            FROM pg_catalog.pg_type t
            JOIN pg_catalog.pg_enum e ON e.enumtypid = t.oid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
            WHERE n.nspname = $1
            ORDER BY t.typname, e.enumsortorder
        "#;

        let rows = sqlx::query_as::<_, EnumRow>(sql)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await?;

        let mut catalog = EnumCatalog::new();
        for row in rows {
            catalog.push_label(&row.type_name, row.label);
        }

        Ok(catalog)
    }
}
