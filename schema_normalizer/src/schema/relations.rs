//! Foreign-key resolution for a single table

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::schema::types::{Column, ColumnType, TableReference};
use crate::utils::naming;

/// Attaches foreign-key metadata to the columns of one table
#[derive(Debug, Default, Clone, Copy)]
pub struct RelationResolver;

impl RelationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Mark every column matched by a reference as a typed foreign key.
    ///
    /// Matching is by physical column name. When several references share a
    /// name the last one wins; constraint/key-usage joins routinely yield
    /// duplicate rows. Unmatched columns pass through unchanged.
    pub fn resolve(
        &self,
        table_name: &str,
        columns: Vec<Column>,
        relations: &[TableReference],
    ) -> Vec<Column> {
        let mut by_name: IndexMap<&str, &TableReference> = IndexMap::new();
        for reference in relations {
            by_name.insert(reference.name.as_str(), reference);
        }

        // Physical names of columns that stay as they are; renamed columns must not collide with them.
        let mut taken: HashSet<String> = columns
            .iter()
            .filter(|c| !by_name.contains_key(c.name.as_str()))
            .map(|c| c.name.clone())
            .collect();

        columns
            .into_iter()
            .map(|column| match by_name.get(column.name.as_str()) {
                Some(reference) => {
                    let name = relation_name(reference, &taken);
                    tracing::trace!(
                        table = table_name,
                        column = %reference.name,
                        references = %reference.table,
                        relation = %name,
                        "Resolved foreign key"
                    );
                    taken.insert(name.clone());
                    into_foreign_key(column, (*reference).clone(), name)
                }
                None => column,
            })
            .collect()
    }
}

fn into_foreign_key(mut column: Column, reference: TableReference, name: String) -> Column {
    column.name = name;
    column.foreign_key = true;
    column.data_type.kind = ColumnType::Reference(naming::type_name(&reference.table));
    column.data_type.size = None;
    column.data_type.values = None;
    column.data_type.references = Some(reference);
    column
}

/// Singular of the referenced table, or a name derived from the physical
/// column when that is already used in the table.
fn relation_name(reference: &TableReference, taken: &HashSet<String>) -> String {
    let preferred = naming::to_one_name(&reference.table);
    if !taken.contains(&preferred) {
        return preferred;
    }

    match naming::strip_key_suffix(&reference.name) {
        Some(stem) if !taken.contains(stem) => stem.to_string(),
        _ => reference.name.clone(),
    }
}
