//! Generic CRUD execution against PostgreSQL.

use super::{assemble, ensure_primary_key, persisted_values, CollectionQuery, Page, Repository, ResourceQuery};
use crate::entity::{Entity, SqlValue};
use crate::error::AppError;
use crate::schema::{EntityModel, SelectedField};
use crate::sql::{self, decode_cell, QueryBuf};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use std::marker::PhantomData;
use uuid::Uuid;

/// Repository over one table. The pool is the only shared handle; no locks, no caching.
pub struct PgRepository<T> {
    pool: PgPool,
    model: EntityModel,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> PgRepository<T> {
    /// Derives the table schema of `T`. Does not touch the database.
    pub fn new(pool: PgPool) -> Result<Self, AppError> {
        let model = EntityModel::derive::<T>()?;
        Ok(PgRepository {
            pool,
            model,
            _entity: PhantomData,
        })
    }

    /// CREATE TABLE IF NOT EXISTS. An existing table is not compared against the schema.
    pub async fn ensure_table(&self) -> Result<(), AppError> {
        let ddl = self.model.schema.create_table_sql();
        tracing::debug!(sql = %ddl, "ensure table");
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    fn query(q: &QueryBuf) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        query
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<PgRow>, AppError> {
        Ok(Self::query(q).fetch_optional(&self.pool).await?)
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<PgRow>, AppError> {
        Ok(Self::query(q).fetch_all(&self.pool).await?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        Ok(Self::query(q).execute(&self.pool).await?.rows_affected())
    }
}

/// Decode the leading cells of `row` positionally against the scan plan.
fn row_to_record<T: Entity>(row: &PgRow, fields: &[SelectedField<'_>]) -> Result<T, AppError> {
    let values = fields
        .iter()
        .enumerate()
        .map(|(i, f)| decode_cell(row, i, f.sql_type))
        .collect::<Result<Vec<SqlValue>, _>>()?;
    assemble(fields, values)
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    fn model(&self) -> &EntityModel {
        &self.model
    }

    async fn get(&self, id: Uuid, query: &ResourceQuery) -> Result<T, AppError> {
        let fields = self.model.field_set(&query.expand)?;
        let q = sql::select_by_key(&self.model.schema, &fields, SqlValue::Uuid(id));
        let row = self
            .fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", self.model.entity(), id)))?;
        row_to_record(&row, &fields)
    }

    async fn list(&self, query: &CollectionQuery) -> Result<Page<T>, AppError> {
        let fields = self.model.field_set(&query.expand)?;
        let q = sql::select_collection(&self.model.schema, &fields, query.limit, query.offset);
        let rows = self.fetch_all(&q).await?;
        // the windowed total follows the selected columns
        let total = match rows.first() {
            Some(row) => row.try_get::<i64, _>(fields.len())?,
            None => 0,
        };
        let items = rows
            .iter()
            .map(|row| row_to_record(row, &fields))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Page { items, total })
    }

    async fn create(&self, mut record: T) -> Result<T, AppError> {
        let id = ensure_primary_key(&self.model, &mut record)?;
        let q = sql::insert(&self.model.schema, persisted_values(&self.model, &record));
        let row = self
            .fetch_optional(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        let created = row_to_record(&row, &self.model.all_fields())?;
        tracing::debug!(entity = self.model.entity(), %id, "created");
        Ok(created)
    }

    async fn update(&self, _id: Uuid, _record: T) -> Result<T, AppError> {
        Err(AppError::Unsupported("update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let q = sql::delete(&self.model.schema, SqlValue::Uuid(id));
        let affected = self.execute(&q).await?;
        tracing::debug!(entity = self.model.entity(), %id, affected, "deleted");
        Ok(())
    }
}
