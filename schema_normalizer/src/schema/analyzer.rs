//! Database schema analyzer
//!
//! Drives a [`SchemaSource`] through "list tables → per-table columns and
//! relations → assemble → normalize relations".

use futures::future::try_join_all;

use crate::config::IntrospectionConfig;
use crate::db::source::{EnumCatalog, SchemaSource};
use crate::error::{Result, SchemaWarning};
use crate::schema::columns::ColumnNormalizer;
use crate::schema::normalizer::normalize_relations;
use crate::schema::relations::RelationResolver;
use crate::schema::types::{Schema, Table, TableReference};

/// Schema analyzer over any engine adapter
pub struct SchemaAnalyzer<S> {
    source: S,
    config: IntrospectionConfig,
}

impl<S: SchemaSource> SchemaAnalyzer<S> {
    /// Create a new schema analyzer
    pub fn new(source: S, config: IntrospectionConfig) -> Self {
        Self { source, config }
    }

    /// Read and normalize the whole schema.
    ///
    /// Tables are fetched concurrently. Any failing table fails the whole
    /// read; a partial schema is never returned.
    pub async fn read_schema(&self) -> Result<Schema> {
        let names = self.get_tables().await?;
        tracing::info!(engine = %self.source.engine(), tables = names.len(), "Reading schema");

        let catalog = self.enum_catalog().await;
        let tables = try_join_all(
            names
                .iter()
                .map(|name| self.build_table(name, &catalog)),
        )
        .await?;

        let schema = normalize_relations(Schema::new(tables));
        tracing::info!(tables = schema.len(), "Schema normalized");

        Ok(schema)
    }

    /// Names of all base tables, minus excluded ones
    pub async fn get_tables(&self) -> Result<Vec<String>> {
        let tables = self.source.list_tables().await?;

        Ok(tables
            .into_iter()
            .filter(|name| {
                let excluded = self.config.is_excluded(name);
                if excluded {
                    tracing::debug!(table = %name, "Skipping excluded table");
                }
                !excluded
            })
            .collect())
    }

    /// Columns of one table with foreign keys resolved, before schema-wide
    /// relation normalization
    pub async fn get_table_schema(&self, name: &str) -> Result<Table> {
        let catalog = self.enum_catalog().await;
        self.build_table(name, &catalog).await
    }

    /// Foreign-key references of one table
    pub async fn get_relations_for_table(&self, name: &str) -> Result<Vec<TableReference>> {
        self.source.fetch_relations(name).await
    }

    async fn build_table(&self, name: &str, catalog: &EnumCatalog) -> Result<Table> {
        tracing::debug!(table = name, "Reading table");

        let (rows, relations) = futures::try_join!(
            self.source.fetch_columns(name),
            self.source.fetch_relations(name),
        )?;

        let mut warnings = Vec::new();
        let columns = ColumnNormalizer::new(self.source.engine(), catalog)
            .normalize_all(&rows, &mut warnings);
        log_warnings(name, &warnings);

        Ok(Table {
            name: name.to_string(),
            columns: RelationResolver::new().resolve(name, columns, &relations),
        })
    }

    /// A missing catalog only degrades enum columns to `unknown`.
    async fn enum_catalog(&self) -> EnumCatalog {
        match self.source.fetch_enum_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                let warning = SchemaWarning::EnumCatalogUnavailable(e.to_string());
                tracing::warn!(%warning, "Continuing without enum labels");
                EnumCatalog::new()
            }
        }
    }
}

fn log_warnings(table: &str, warnings: &[SchemaWarning]) {
    for warning in warnings {
        tracing::warn!(table, %warning, "Column degraded to unknown type");
    }
}
