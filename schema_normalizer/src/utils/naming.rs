//! Naming utilities
//!
//! Derives relation column names and type names from table names.

use inflector::Inflector;

/// Convert a singular name to plural
pub fn pluralize(name: &str) -> String {
    // Handle special cases first
    match name.to_lowercase().as_str() {
        "person" => "people".to_string(),
        "child" => "children".to_string(),
        "man" => "men".to_string(),
        "woman" => "women".to_string(),
        "foot" => "feet".to_string(),
        "tooth" => "teeth".to_string(),
        "goose" => "geese".to_string(),
        "mouse" => "mice".to_string(),
        _ => name.to_plural(),
    }
}

/// Convert a plural name to singular
pub fn singularize(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "people" => "person".to_string(),
        "children" => "child".to_string(),
        "men" => "man".to_string(),
        "women" => "woman".to_string(),
        "feet" => "foot".to_string(),
        "teeth" => "tooth".to_string(),
        "geese" => "goose".to_string(),
        "mice" => "mouse".to_string(),
        _ => name.to_singular(),
    }
}

/// Type name for rows of a table: `users` -> `User`, `user_profiles` -> `UserProfile`
pub fn type_name(table: &str) -> String {
    singularize(table).to_pascal_case()
}

/// Logical name of a to-one relation column: `users` -> `user`
pub fn to_one_name(table: &str) -> String {
    singularize(table)
}

/// Logical name of a to-many relation column: `user` or `users` -> `users`
pub fn to_many_name(table: &str) -> String {
    pluralize(&singularize(table))
}

/// Strip a trailing key suffix from a physical column name: `author_id` -> `author`
pub fn strip_key_suffix(column: &str) -> Option<&str> {
    column
        .strip_suffix("_id")
        .or_else(|| column.strip_suffix("Id"))
        .filter(|stem| !stem.is_empty())
}
