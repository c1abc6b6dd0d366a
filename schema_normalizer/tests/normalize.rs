//! Column, foreign-key and relation normalization

use pretty_assertions::assert_eq;
use rstest::*;

use schema_normalizer::schema::{ColumnNormalizer, RelationResolver};
use schema_normalizer::{
    normalize_relations, Column, ColumnType, Engine, EnumCatalog, RawColumn, Relation, Schema,
    SchemaWarning, Table, TableReference,
};

/// Build a table the way the analyzer does: physical columns first, then
/// foreign keys resolved from the references attached by [`fk`].
fn table(name: &str, columns: Vec<Column>) -> Table {
    let relations: Vec<TableReference> = columns
        .iter()
        .filter_map(|c| c.data_type.references.clone())
        .collect();
    let columns = columns
        .into_iter()
        .map(|mut c| {
            c.data_type.references = None;
            c
        })
        .collect();

    Table {
        name: name.to_string(),
        columns: RelationResolver::new().resolve(name, columns, &relations),
    }
}

fn id() -> Column {
    Column::new("id", ColumnType::Number).primary()
}

/// Physical key column carrying the reference the resolver should attach
fn fk(name: &str, table: &str) -> Column {
    let mut column = Column::new(name, ColumnType::Number).nullable(false);
    column.data_type.references = Some(TableReference::new(name, table, "id"));
    column
}

/// Every reference points at a table of the schema, and carries a reference
/// iff the column is a foreign key.
fn assert_references_resolve(schema: &Schema) {
    for table in &schema.tables {
        for column in &table.columns {
            assert_eq!(
                column.foreign_key,
                column.data_type.references.is_some(),
                "{}.{}",
                table.name,
                column.name
            );
            if let Some(reference) = &column.data_type.references {
                assert!(
                    schema.table(&reference.table).is_some(),
                    "{}.{} references missing table {}",
                    table.name,
                    column.name,
                    reference.table
                );
            }
        }
    }
}

#[rstest]
#[case(Engine::Postgres, "integer", "YES")]
#[case(Engine::Postgres, "uuid", "NO")]
#[case(Engine::MySql, "int", "YES")]
#[case(Engine::MySql, "bigint", "NO")]
fn test_primary_key_is_never_nullable(
    #[case] engine: Engine,
    #[case] data_type: &str,
    #[case] nullable: &str,
) {
    let catalog = EnumCatalog::new();
    let raw = RawColumn {
        is_nullable: nullable.to_string(),
        ..RawColumn::new("id", data_type).constraint("PRIMARY KEY")
    };

    let column = ColumnNormalizer::new(engine, &catalog).normalize(&raw);

    assert!(column.primary);
    assert!(column.unique);
    assert!(!column.allow_null);
    assert!(!column.foreign_key);
}

#[test]
fn test_sized_string_column() {
    let catalog = EnumCatalog::new();
    let raw = RawColumn::new("test", "character varying")
        .not_null()
        .max_length(255)
        .constraint("PRIMARY KEY");

    let column = ColumnNormalizer::new(Engine::Postgres, &catalog).normalize(&raw);

    assert_eq!(column.name, "test");
    assert!(column.primary);
    assert!(!column.allow_null);
    assert!(!column.foreign_key);
    assert!(column.unique);
    assert_eq!(column.data_type.kind, ColumnType::String);
    assert_eq!(column.data_type.size, Some(255));
}

#[rstest]
#[case(Some("UNIQUE"), false, true)]
#[case(Some("FOREIGN KEY"), false, false)]
#[case(None, false, false)]
fn test_constraint_flags(
    #[case] constraint: Option<&str>,
    #[case] primary: bool,
    #[case] unique: bool,
) {
    let catalog = EnumCatalog::new();
    let raw = RawColumn {
        constraint_type: constraint.map(str::to_string),
        ..RawColumn::new("email", "text")
    };

    let column = ColumnNormalizer::new(Engine::Postgres, &catalog).normalize(&raw);

    assert_eq!(column.primary, primary);
    assert_eq!(column.unique, unique);
    assert!(column.allow_null);
    assert!(!column.foreign_key);
}

#[test]
fn test_user_defined_enum_resolves_labels() {
    let catalog: EnumCatalog = [("yes_no", vec!["no".to_string(), "yes".to_string()])]
        .into_iter()
        .collect();
    let raw = RawColumn::new("active", "USER-DEFINED").type_name("yes_no");

    let mut warnings = Vec::new();
    let column =
        ColumnNormalizer::new(Engine::Postgres, &catalog).normalize_with_warnings(&raw, &mut warnings);

    assert_eq!(column.data_type.kind, ColumnType::Enum);
    assert_eq!(
        column.data_type.values,
        Some(vec!["no".to_string(), "yes".to_string()])
    );
    assert!(warnings.is_empty());
}

#[test]
fn test_mysql_enum_uses_column_type_literal() {
    let literal = "enum('No','Yes')";
    let catalog: EnumCatalog = [(literal, vec!["No".to_string(), "Yes".to_string()])]
        .into_iter()
        .collect();
    let raw = RawColumn::new("active", "enum").type_name(literal);

    let column = ColumnNormalizer::new(Engine::MySql, &catalog).normalize(&raw);

    assert_eq!(column.data_type.kind, ColumnType::Enum);
    assert_eq!(
        column.data_type.values,
        Some(vec!["No".to_string(), "Yes".to_string()])
    );
}

#[test]
fn test_unresolved_enum_degrades_to_unknown() {
    let catalog: EnumCatalog = [("empty", Vec::<String>::new())].into_iter().collect();
    let normalizer = ColumnNormalizer::new(Engine::Postgres, &catalog);

    let mut warnings = Vec::new();
    let missing = normalizer.normalize_with_warnings(
        &RawColumn::new("status", "USER-DEFINED").type_name("status"),
        &mut warnings,
    );
    let empty = normalizer.normalize_with_warnings(
        &RawColumn::new("mood", "USER-DEFINED").type_name("empty"),
        &mut warnings,
    );

    assert_eq!(missing.data_type.kind, ColumnType::Unknown);
    assert_eq!(missing.data_type.values, None);
    assert_eq!(empty.data_type.kind, ColumnType::Unknown);
    assert_eq!(
        warnings,
        vec![
            SchemaWarning::EnumResolution {
                column: "status".to_string(),
                type_name: "status".to_string(),
            },
            SchemaWarning::EnumResolution {
                column: "mood".to_string(),
                type_name: "empty".to_string(),
            },
        ]
    );
}

#[test]
fn test_unmapped_type_degrades_to_unknown() {
    let catalog = EnumCatalog::new();
    let raw = RawColumn::new("area", "geometry").max_length(10);

    let mut warnings = Vec::new();
    let column =
        ColumnNormalizer::new(Engine::Postgres, &catalog).normalize_with_warnings(&raw, &mut warnings);

    assert_eq!(column.data_type.kind, ColumnType::Unknown);
    assert_eq!(column.data_type.size, None);
    assert_eq!(
        warnings,
        vec![SchemaWarning::UnmappedType {
            column: "area".to_string(),
            native_type: "geometry".to_string(),
        }]
    );
}

#[test]
fn test_rows_of_the_same_column_are_merged() {
    let catalog = EnumCatalog::new();
    let rows = vec![
        RawColumn::new("id", "integer").constraint("PRIMARY KEY"),
        RawColumn::new("user_id", "integer").not_null().constraint("FOREIGN KEY"),
        RawColumn::new("user_id", "integer").not_null().constraint("UNIQUE"),
        RawColumn::new("note", "text"),
    ];

    let columns =
        ColumnNormalizer::new(Engine::Postgres, &catalog).normalize_all(&rows, &mut Vec::new());

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "user_id", "note"]);
    assert!(columns[1].unique);
    assert!(!columns[1].primary);
    assert!(!columns[1].allow_null);
}

#[test]
fn test_foreign_key_becomes_typed_reference() {
    let accounts = table("accounts", vec![id(), fk("user_id", "users")]);

    let user = accounts.column("user").expect("user relation");
    assert!(user.foreign_key);
    assert_eq!(user.data_type.kind, ColumnType::Reference("User".to_string()));
    assert_eq!(
        user.data_type.references,
        Some(TableReference::new("user_id", "users", "id"))
    );
    assert!(!accounts.has_column("user_id"));
}

#[test]
fn test_duplicate_references_last_write_wins() {
    let columns = vec![id(), Column::new("owner_id", ColumnType::Number)];
    let relations = vec![
        TableReference::new("owner_id", "users", "id"),
        TableReference::new("owner_id", "organizations", "id"),
    ];

    let columns = RelationResolver::new().resolve("projects", columns, &relations);

    assert_eq!(columns[1].name, "organization");
    assert_eq!(
        columns[1].data_type.kind,
        ColumnType::Reference("Organization".to_string())
    );
    assert_eq!(
        columns[1].data_type.references.as_ref().map(|r| r.table.as_str()),
        Some("organizations")
    );
}

#[test]
fn test_unmatched_columns_pass_through() {
    let name = Column::new("name", ColumnType::String).nullable(false);
    let columns = RelationResolver::new().resolve(
        "users",
        vec![id(), name.clone()],
        &[TableReference::new("missing_id", "others", "id")],
    );

    assert_eq!(columns, vec![id(), name]);
}

#[test]
fn test_two_references_to_the_same_table_keep_unique_names() {
    let posts = table(
        "posts",
        vec![id(), fk("author_id", "users"), fk("editor_id", "users")],
    );

    let names: Vec<&str> = posts.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "user", "editor"]);
    assert_eq!(
        posts.columns[2].data_type.kind,
        ColumnType::Reference("User".to_string())
    );
}

#[test]
fn test_one_to_one_and_many_to_one() {
    let schema = Schema::new(vec![
        table("accounts", vec![id()]),
        table("applications", vec![id()]),
        table(
            "subscriptions",
            vec![
                id(),
                fk("account_id", "accounts").unique(),
                fk("application_id", "applications"),
            ],
        ),
    ]);

    let normalized = normalize_relations(schema);

    assert_eq!(normalized.len(), 3);
    let subscriptions = normalized.table("subscriptions").expect("not a junction");
    let account = subscriptions.column("account").expect("account relation");
    let application = subscriptions.column("application").expect("application relation");

    assert!(account.foreign_key && account.unique);
    assert_eq!(account.relation, Some(Relation::OneToOne));
    assert!(application.foreign_key && !application.unique);
    assert_eq!(application.relation, Some(Relation::ManyToOne));
}

fn group_users_schema() -> Schema {
    Schema::new(vec![
        table(
            "groups",
            vec![id(), Column::new("name", ColumnType::String)],
        ),
        table(
            "group_users",
            vec![fk("group_id", "groups"), fk("user_id", "users")],
        ),
        table(
            "users",
            vec![id(), Column::new("email", ColumnType::String).unique()],
        ),
    ])
}

#[test]
fn test_junction_table_collapses_into_many_to_many() {
    let normalized = normalize_relations(group_users_schema());

    let names: Vec<&str> = normalized.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["groups", "users"]);

    let groups = normalized.table("groups").expect("groups");
    let users = groups.column("users").expect("synthetic users column");
    assert!(users.foreign_key);
    assert!(!users.unique);
    assert_eq!(users.data_type.kind, ColumnType::Reference("User".to_string()));
    assert_eq!(
        users.data_type.references,
        Some(TableReference::new("user_id", "users", "id"))
    );
    assert_eq!(
        users.relation,
        Some(Relation::ManyToMany {
            through: "group_users".to_string()
        })
    );

    let users_table = normalized.table("users").expect("users");
    let groups_column = users_table.column("groups").expect("synthetic groups column");
    assert_eq!(
        groups_column.data_type.kind,
        ColumnType::Reference("Group".to_string())
    );
    assert_eq!(
        groups_column.data_type.references,
        Some(TableReference::new("group_id", "groups", "id"))
    );
}

/// `a` linked to the `b_c` junction, which itself links `b` and `c`
fn chained_junctions_schema() -> Schema {
    Schema::new(vec![
        table("a", vec![id()]),
        table("b", vec![id()]),
        table("c", vec![id()]),
        table("b_c", vec![fk("b_id", "b"), fk("c_id", "c")]),
        table("a_b_c", vec![fk("a_id", "a"), fk("b_c_id", "b_c")]),
    ])
}

fn mixed_schema() -> Schema {
    Schema::new(vec![
        table("users", vec![id(), Column::new("email", ColumnType::String)]),
        table("groups", vec![id()]),
        table("tags", vec![id()]),
        table("group_users", vec![fk("group_id", "groups"), fk("user_id", "users")]),
        table("group_tags", vec![fk("group_id", "groups"), fk("tag_id", "tags")]),
        table("friendships", vec![fk("user_id", "users"), fk("friend_id", "users")]),
        table("accounts", vec![id(), fk("user_id", "users").unique()]),
    ])
}

#[test]
fn test_junction_linked_to_a_junction_is_kept() {
    let normalized = normalize_relations(chained_junctions_schema());

    let names: Vec<&str> = normalized.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "b_c", "a_b_c"]);
    assert!(!normalized.table("a").expect("a").has_column("b_cs"));
    assert!(!normalized.table("b").expect("b").has_column("cs"));
    assert_references_resolve(&normalized);
}

#[test]
fn test_referenced_junction_is_kept() {
    let schema = Schema::new(vec![
        table("groups", vec![id()]),
        table("users", vec![id()]),
        table("group_users", vec![fk("group_id", "groups"), fk("user_id", "users")]),
        table("audits", vec![id(), fk("membership_id", "group_users")]),
    ]);

    let normalized = normalize_relations(schema);

    assert_eq!(normalized.len(), 4);
    assert!(!normalized.table("groups").expect("groups").has_column("users"));
    assert_references_resolve(&normalized);
}

#[rstest]
#[case::group_users(group_users_schema())]
#[case::chained_junctions(chained_junctions_schema())]
#[case::mixed(mixed_schema())]
#[case::empty(Schema::default())]
fn test_normalization_is_idempotent(#[case] schema: Schema) {
    let once = normalize_relations(schema);
    let twice = normalize_relations(once.clone());

    assert_references_resolve(&once);
    assert_eq!(twice, once);
}

#[test]
fn test_junction_with_surrogate_key_is_kept() {
    let schema = Schema::new(vec![
        table("groups", vec![id()]),
        table("memberships", vec![id(), fk("group_id", "groups"), fk("user_id", "users")]),
        table("users", vec![id()]),
    ]);

    let normalized = normalize_relations(schema);

    assert_eq!(normalized.len(), 3);
    assert!(!normalized.table("users").expect("users").has_column("groups"));
}

#[test]
fn test_junction_with_missing_endpoint_is_kept() {
    let schema = Schema::new(vec![
        table("groups", vec![id()]),
        table("group_users", vec![fk("group_id", "groups"), fk("user_id", "users")]),
    ]);

    let normalized = normalize_relations(schema);

    assert_eq!(normalized.len(), 2);
    assert!(!normalized.table("groups").expect("groups").has_column("users"));
}

#[test]
fn test_self_referencing_pair_is_not_a_junction() {
    let schema = Schema::new(vec![
        table("users", vec![id()]),
        table(
            "friendships",
            vec![fk("user_id", "users"), fk("friend_id", "users")],
        ),
    ]);

    let normalized = normalize_relations(schema);

    assert_eq!(normalized.len(), 2);
    let friendships = normalized.table("friendships").expect("friendships");
    let names: Vec<&str> = friendships.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["user", "friend"]);
}

#[test]
fn test_many_to_many_name_collision_is_skipped() {
    let schema = Schema::new(vec![
        table(
            "groups",
            vec![id(), Column::new("users", ColumnType::Number)],
        ),
        table("group_users", vec![fk("group_id", "groups"), fk("user_id", "users")]),
        table("users", vec![id()]),
    ]);

    let normalized = normalize_relations(schema);

    let groups = normalized.table("groups").expect("groups");
    assert_eq!(groups.columns.len(), 2);
    assert_eq!(
        groups.column("users").map(|c| &c.data_type.kind),
        Some(&ColumnType::Number)
    );
    assert!(normalized.table("users").expect("users").has_column("groups"));
}

#[test]
fn test_users_and_accounts_end_to_end() {
    let schema = Schema::new(vec![
        table(
            "users",
            vec![id(), Column::new("name", ColumnType::String)],
        ),
        table(
            "accounts",
            vec![id(), fk("user_id", "users").unique()],
        ),
    ]);

    let normalized = normalize_relations(schema);

    assert_eq!(normalized.len(), 2);
    let user = normalized
        .table("accounts")
        .and_then(|t| t.column("user"))
        .expect("user relation");
    assert_eq!(user.data_type.kind.to_string(), "User");
    assert!(user.foreign_key);
    assert_eq!(user.relation, Some(Relation::OneToOne));
}

#[test]
fn test_serialized_shape() {
    let accounts = table("accounts", vec![fk("user_id", "users")]);

    let value = serde_json::to_value(&accounts).expect("serializable");

    assert_eq!(
        value,
        serde_json::json!({
            "name": "accounts",
            "columns": [{
                "name": "user",
                "allowNull": false,
                "primary": false,
                "unique": false,
                "foreignKey": true,
                "dataType": {
                    "type": "User",
                    "references": { "name": "user_id", "table": "users", "column": "id" }
                }
            }]
        })
    );

    let back: Table = serde_json::from_value(value).expect("deserializable");
    assert_eq!(back, accounts);
}
