//! Schema-wide relation normalization
//!
//! Classifies every foreign key as one-to-one or many-to-one and collapses
//! junction tables into symmetric many-to-many columns on both endpoints.

use std::collections::HashSet;

use crate::schema::types::{Column, ColumnType, DataType, Relation, Schema, Table, TableReference};
use crate::utils::naming;

/// A junction table and its two foreign-key edges
#[derive(Debug, Clone)]
struct Junction {
    name: String,
    left: TableReference,
    right: TableReference,
}

/// Classify relations and collapse junction tables.
///
/// Runs in three steps over the full table set: classify every table, drop
/// junctions, then inject the many-to-many columns. Output order is input
/// order minus the removed junctions. Running it on its own output is a no-op.
///
/// No table in the output references a table that was removed: a junction
/// is only collapsed when both of its endpoints survive and no other table
/// points at it.
pub fn normalize_relations(schema: Schema) -> Schema {
    let mut tables: Vec<Table> = schema.tables.into_iter().map(classify).collect();

    let present: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    let candidates: Vec<Junction> = tables
        .iter()
        .filter_map(|table| as_junction(table, &present))
        .collect();
    let candidate_names: HashSet<&str> = candidates.iter().map(|j| j.name.as_str()).collect();

    let junctions: Vec<Junction> = candidates
        .iter()
        .filter(|junction| collapsible(junction, &candidate_names, &tables))
        .cloned()
        .collect();

    let removed: HashSet<String> = junctions.iter().map(|j| j.name.clone()).collect();
    tables.retain(|table| !removed.contains(&table.name));

    for junction in &junctions {
        tracing::debug!(
            table = %junction.name,
            left = %junction.left.table,
            right = %junction.right.table,
            "Collapsing junction table"
        );
        inject(&mut tables, &junction.left.table, &junction.right, &junction.name);
        inject(&mut tables, &junction.right.table, &junction.left, &junction.name);
    }

    Schema::new(tables)
}

/// Both endpoints must be ordinary tables and nothing may reference the
/// junction itself, otherwise removing it would leave a dangling reference.
fn collapsible(junction: &Junction, candidates: &HashSet<&str>, tables: &[Table]) -> bool {
    if candidates.contains(junction.left.table.as_str())
        || candidates.contains(junction.right.table.as_str())
    {
        tracing::debug!(table = %junction.name, "Keeping junction table linked to another junction");
        return false;
    }

    let referenced = tables
        .iter()
        .filter(|t| t.name != junction.name)
        .flat_map(Table::references)
        .any(|r| r.table == junction.name);
    if referenced {
        tracing::debug!(table = %junction.name, "Keeping junction table referenced by another table");
    }
    !referenced
}

/// One-to-one when the foreign key is also unique, many-to-one otherwise.
/// Many-to-many columns keep their classification.
fn classify(mut table: Table) -> Table {
    for column in table.columns.iter_mut().filter(|c| c.foreign_key) {
        if matches!(column.relation, Some(Relation::ManyToMany { .. })) {
            continue;
        }
        column.relation = Some(if column.unique {
            Relation::OneToOne
        } else {
            Relation::ManyToOne
        });
    }
    table
}

/// A table is a junction iff every column is a plain foreign key, there are
/// exactly two of them, and they reference two distinct tables present in
/// the schema.
///
/// A two-foreign-key entity table without further columns is indistinguishable
/// from a junction and is collapsed as well.
fn as_junction(table: &Table, present: &HashSet<&str>) -> Option<Junction> {
    if table.columns.len() != 2 {
        return None;
    }

    let is_plain_fk = |c: &Column| {
        c.foreign_key && !matches!(c.relation, Some(Relation::ManyToMany { .. }))
    };
    if !table.columns.iter().all(is_plain_fk) {
        return None;
    }

    let mut references = table.references();
    let left = references.next()?.clone();
    let right = references.next()?.clone();

    let distinct = left.table != right.table;
    let endpoints_present =
        present.contains(left.table.as_str()) && present.contains(right.table.as_str());
    if !distinct || !endpoints_present || left.table == table.name || right.table == table.name {
        return None;
    }

    Some(Junction {
        name: table.name.clone(),
        left,
        right,
    })
}

/// Add a "many of `other.table`" column to `target`
fn inject(tables: &mut [Table], target: &str, other: &TableReference, through: &str) {
    let Some(table) = tables.iter_mut().find(|t| t.name == target) else {
        return;
    };

    let name = naming::to_many_name(&other.table);
    if table.has_column(&name) {
        tracing::warn!(
            table = target,
            column = %name,
            through,
            "Skipping many-to-many relation, column name already in use"
        );
        return;
    }

    table.add_column(Column {
        name,
        allow_null: true,
        primary: false,
        unique: false,
        foreign_key: true,
        data_type: DataType {
            references: Some(other.clone()),
            ..DataType::new(ColumnType::Reference(naming::type_name(&other.table)))
        },
        relation: Some(Relation::ManyToMany {
            through: through.to_string(),
        }),
    });
}
