//! Naming: field identifiers -> snake_case column names, type names -> pluralized table names.

use heck::ToSnakeCase;
use regex::Regex;
use std::sync::OnceLock;

/// Column name for a field identifier.
/// e.g. "project_id" -> "project_id", "ProjectID" -> "project_id"
pub fn column_name(field: &str) -> String {
    field.to_snake_case()
}

/// Table name for a record type: snake_case with the last word pluralized.
/// e.g. "Project" -> "projects", "TaskType" -> "task_types", "Status" -> "statuses"
pub fn table_name(type_name: &str) -> String {
    let snake = type_name.to_snake_case();
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralizer::pluralize(last, 2, false)),
        None => pluralizer::pluralize(&snake, 2, false),
    }
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier pattern is valid"))
}

/// Whether a derived name is safe to interpolate into SQL text.
pub fn is_valid_identifier(name: &str) -> bool {
    name.len() <= 63 && identifier_pattern().is_match(name)
}
