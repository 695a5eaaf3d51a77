//! Builds parameterized SELECT, INSERT, DELETE from a table schema and a resolved field set.

use crate::entity::SqlValue;
use crate::schema::{SelectedField, TableSchema};

/// Quote identifier for PostgreSQL (safe: names come from the derived schema only).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Alias of the windowed row count appended to collection selects.
pub const TOTAL_COLUMN: &str = "total";

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    /// Appends a parameter and returns its placeholder index.
    fn push_param(&mut self, v: SqlValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn column_list(fields: &[SelectedField<'_>]) -> String {
    fields
        .iter()
        .map(|f| quoted(f.column()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn pk_column(schema: &TableSchema) -> String {
    quoted(&schema.primary_key().name)
}

/// SELECT by primary key. `id` is bound as $1.
pub fn select_by_key(schema: &TableSchema, fields: &[SelectedField<'_>], id: SqlValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        column_list(fields),
        quoted(&schema.name),
        pk_column(schema),
        n
    );
    q
}

/// SELECT page with the windowed total as the last column. A limit or offset <= 0 omits its clause.
pub fn select_collection(schema: &TableSchema, fields: &[SelectedField<'_>], limit: i64, offset: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sql = format!(
        "SELECT {}, COUNT(*) OVER() AS {} FROM {} ORDER BY {}",
        column_list(fields),
        TOTAL_COLUMN,
        quoted(&schema.name),
        pk_column(schema)
    );
    if limit > 0 {
        let n = q.push_param(SqlValue::BigInt(limit));
        sql.push_str(&format!(" LIMIT ${}", n));
    }
    if offset > 0 {
        let n = q.push_param(SqlValue::BigInt(offset));
        sql.push_str(&format!(" OFFSET ${}", n));
    }
    q.sql = sql;
    q
}

/// INSERT every persisted field, values in column order.
pub fn insert(schema: &TableSchema, values: Vec<SqlValue>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (col, v) in schema.columns.iter().zip(values) {
        let n = q.push_param(v);
        cols.push(quoted(&col.name));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        quoted(&schema.name),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// DELETE by primary key. `id` is bound as $1.
pub fn delete(schema: &TableSchema, id: SqlValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${}",
        quoted(&schema.name),
        pk_column(schema),
        n
    );
    q
}
