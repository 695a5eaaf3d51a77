//! Repository: typed CRUD over one entity, with a PostgreSQL and an in-memory variant.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::entity::{Entity, SqlValue};
use crate::error::AppError;
use crate::schema::{EntityModel, SelectedField};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// Query for a single resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResourceQuery {
    pub expand: Vec<String>,
}

/// Query for a page of a collection. A limit or offset of 0 means unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionQuery {
    pub limit: i64,
    pub offset: i64,
    #[serde(skip)]
    pub expand: Vec<String>,
}

impl CollectionQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
}

impl Default for CollectionQuery {
    fn default() -> Self {
        CollectionQuery {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
            expand: Vec::new(),
        }
    }
}

/// One page of records plus the number of records across all pages.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// CRUD over records of type `T`. Each call is one round trip to the store.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Derived shape of `T` this repository reads and writes.
    fn model(&self) -> &EntityModel;

    /// Fetch by primary key; `NotFound` when no row matches.
    async fn get(&self, id: Uuid, query: &ResourceQuery) -> Result<T, AppError>;

    async fn list(&self, query: &CollectionQuery) -> Result<Page<T>, AppError>;

    /// Insert; a nil primary key is replaced by a fresh random id first.
    async fn create(&self, record: T) -> Result<T, AppError>;

    /// Not supported by the shipped repositories.
    async fn update(&self, id: Uuid, record: T) -> Result<T, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Assigns a random id when the primary key still holds the nil id.
pub(crate) fn ensure_primary_key<T: Entity>(model: &EntityModel, record: &mut T) -> Result<Uuid, AppError> {
    let pk = model.primary_key();
    let current = match record.get(pk.name) {
        Some(SqlValue::Uuid(u)) => u,
        _ => Uuid::nil(),
    };
    if !current.is_nil() {
        return Ok(current);
    }
    let id = Uuid::new_v4();
    record.set(pk.name, SqlValue::Uuid(id))?;
    Ok(id)
}

/// Values of every persisted field, in column order. A nil id in a foreign-key column is stored as NULL.
pub(crate) fn persisted_values<T: Entity>(model: &EntityModel, record: &T) -> Vec<SqlValue> {
    model
        .all_fields()
        .iter()
        .zip(&model.schema.columns)
        .map(|(f, col)| match record.get(f.field.name) {
            Some(SqlValue::Uuid(u)) if u.is_nil() && col.is_foreign_key() => SqlValue::Null(f.sql_type),
            Some(v) => v,
            None => SqlValue::Null(f.sql_type),
        })
        .collect()
}

/// Builds a record from values positioned like `fields`; everything else keeps its default.
pub(crate) fn assemble<T: Entity>(
    fields: &[SelectedField<'_>],
    values: impl IntoIterator<Item = SqlValue>,
) -> Result<T, AppError> {
    let mut record = T::default();
    for (f, v) in fields.iter().zip(values) {
        record.set(f.field.name, v)?;
    }
    Ok(record)
}
