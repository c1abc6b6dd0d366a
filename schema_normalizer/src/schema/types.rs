//! Canonical, database-agnostic schema model

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized schema: one entry per base table, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Find a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl From<Vec<Table>> for Schema {
    fn from(tables: Vec<Table>) -> Self {
        Self::new(tables)
    }
}

/// Represents a database table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Find a column by its logical name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Foreign-key references carried by this table's columns
    pub fn references(&self) -> impl Iterator<Item = &TableReference> {
        self.columns
            .iter()
            .filter(|c| c.foreign_key)
            .filter_map(|c| c.data_type.references.as_ref())
    }
}

/// Represents a normalized column
///
/// For foreign keys `name` is the logical relation name (the singular of the
/// referenced table), not the physical column name. The physical name lives
/// in `data_type.references.name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub allow_null: bool,
    pub primary: bool,
    pub unique: bool,
    pub foreign_key: bool,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
}

impl Column {
    /// Create a new nullable, unconstrained column
    pub fn new(name: &str, kind: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            allow_null: true,
            primary: false,
            unique: false,
            foreign_key: false,
            data_type: DataType::new(kind),
            relation: None,
        }
    }

    /// Mark the column as primary key. Primary keys are never nullable.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self.unique = true;
        self.allow_null = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.allow_null = nullable && !self.primary;
        self
    }
}

/// Type information of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    #[serde(rename = "type")]
    pub kind: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Enum labels in engine order. Present only for `ColumnType::Enum`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<TableReference>,
}

impl DataType {
    pub fn new(kind: ColumnType) -> Self {
        Self {
            kind,
            size: None,
            values: None,
            references: None,
        }
    }

    pub fn sized(kind: ColumnType, size: u32) -> Self {
        Self {
            size: Some(size),
            ..Self::new(kind)
        }
    }

    pub fn enumeration(values: Vec<String>) -> Self {
        Self {
            values: Some(values),
            ..Self::new(ColumnType::Enum)
        }
    }
}

/// Canonical column type. Foreign keys become a `Reference` to the type
/// named after the referenced table.
///
/// Serializes to the plain strings `string`, `number`, `boolean`, `date`,
/// `enum`, `unknown`, or the referenced type name (e.g. `User`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    Date,
    Enum,
    Unknown,
    Reference(String),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Number => write!(f, "number"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Enum => write!(f, "enum"),
            ColumnType::Unknown => write!(f, "unknown"),
            ColumnType::Reference(name) => write!(f, "{}", name),
        }
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "string" => ColumnType::String,
            "number" => ColumnType::Number,
            "boolean" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "enum" => ColumnType::Enum,
            "unknown" => ColumnType::Unknown,
            _ => ColumnType::Reference(value),
        }
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.to_string()
    }
}

/// A foreign-key edge: physical column `name` points at `table.column`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableReference {
    pub name: String,
    pub table: String,
    pub column: String,
}

impl TableReference {
    pub fn new(name: &str, table: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

/// Shape of the relation a foreign-key column realizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Relation {
    /// Unique foreign key
    OneToOne,
    /// Plain foreign key
    ManyToOne,
    /// Collapsed from the junction table `through`
    ManyToMany { through: String },
}
