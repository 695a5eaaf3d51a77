//! In-process repository with the same field-set semantics as the SQL one. For tests and prototyping.

use super::{assemble, ensure_primary_key, persisted_values, CollectionQuery, Page, Repository, ResourceQuery};
use crate::entity::{Entity, SqlValue};
use crate::error::AppError;
use crate::schema::{EntityModel, SelectedField};
use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

/// Rows are kept as persisted values in column order, sorted by primary key like the SQL listing.
pub struct MemoryRepository<T> {
    model: EntityModel,
    rows: RwLock<Vec<Vec<SqlValue>>>,
    _entity: std::marker::PhantomData<fn() -> T>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Result<Self, AppError> {
        Ok(MemoryRepository {
            model: EntityModel::derive::<T>()?,
            rows: RwLock::new(Vec::new()),
            _entity: std::marker::PhantomData,
        })
    }

    fn pk_index(&self) -> usize {
        let pk = self.model.primary_key();
        self.model
            .all_fields()
            .iter()
            .position(|f| f.field.name == pk.name)
            .unwrap_or(0)
    }

    fn poisoned() -> AppError {
        AppError::Storage("memory store lock poisoned".into())
    }
}

fn uuid_of(row: &[SqlValue], pk: usize) -> Uuid {
    match row.get(pk) {
        Some(SqlValue::Uuid(u)) => *u,
        _ => Uuid::nil(),
    }
}

/// Picks the cells of `row` named by `fields` out of the full column list.
fn project(all: &[SelectedField<'_>], row: &[SqlValue], fields: &[SelectedField<'_>]) -> Vec<SqlValue> {
    fields
        .iter()
        .map(|f| {
            all.iter()
                .position(|a| a.field.name == f.field.name)
                .and_then(|i| row.get(i).cloned())
                .unwrap_or(SqlValue::Null(f.sql_type))
        })
        .collect()
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn model(&self) -> &EntityModel {
        &self.model
    }

    async fn get(&self, id: Uuid, query: &ResourceQuery) -> Result<T, AppError> {
        let fields = self.model.field_set(&query.expand)?;
        let all = self.model.all_fields();
        let pk = self.pk_index();
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        let row = rows
            .iter()
            .find(|r| uuid_of(r, pk) == id)
            .ok_or_else(|| AppError::NotFound(format!("{} {}", self.model.entity(), id)))?;
        assemble(&fields, project(&all, row, &fields))
    }

    async fn list(&self, query: &CollectionQuery) -> Result<Page<T>, AppError> {
        let fields = self.model.field_set(&query.expand)?;
        let all = self.model.all_fields();
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        let skip = usize::try_from(query.offset.max(0)).unwrap_or(usize::MAX);
        let take = if query.limit > 0 {
            usize::try_from(query.limit).unwrap_or(usize::MAX)
        } else {
            usize::MAX
        };
        let items = rows
            .iter()
            .skip(skip)
            .take(take)
            .map(|row| assemble(&fields, project(&all, row, &fields)))
            .collect::<Result<Vec<T>, _>>()?;
        // the windowed count rides on returned rows, so an empty page has no total
        let total = if items.is_empty() { 0 } else { rows.len() as i64 };
        Ok(Page { items, total })
    }

    async fn create(&self, mut record: T) -> Result<T, AppError> {
        let id = ensure_primary_key(&self.model, &mut record)?;
        let values = persisted_values(&self.model, &record);
        let pk = self.pk_index();
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        if rows.iter().any(|r| uuid_of(r, pk) == id) {
            return Err(AppError::Storage(format!(
                "duplicate key {} for {}",
                id,
                self.model.entity()
            )));
        }
        let at = rows.partition_point(|r| uuid_of(r, pk) < id);
        rows.insert(at, values.clone());
        drop(rows);
        assemble(&self.model.all_fields(), values)
    }

    async fn update(&self, _id: Uuid, _record: T) -> Result<T, AppError> {
        Err(AppError::Unsupported("update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let pk = self.pk_index();
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        rows.retain(|r| uuid_of(r, pk) != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, Task};

    fn project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_list_counts_it() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        let created = repo.create(project("Test Project")).await.unwrap();
        assert!(!created.uuid.is_nil());

        let page = repo.list(&CollectionQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Test Project");
    }

    #[tokio::test]
    async fn explicit_id_is_kept_and_duplicates_fail() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        let id = Uuid::new_v4();
        let p = Project {
            uuid: id,
            ..project("a")
        };
        assert_eq!(repo.create(p.clone()).await.unwrap().uuid, id);
        assert!(matches!(repo.create(p).await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn get_respects_expansion() {
        let repo = MemoryRepository::<Task>::new().unwrap();
        let created = repo
            .create(Task {
                summary: "s".into(),
                description: "d".into(),
                project_id: Uuid::new_v4(),
                ..Default::default()
            })
            .await
            .unwrap();

        let bare = repo.get(created.uuid, &ResourceQuery::default()).await.unwrap();
        assert_eq!(bare.uuid, created.uuid);
        assert_eq!(bare.summary, "");

        let query = ResourceQuery {
            expand: repo.model().expandable_wire_names(),
        };
        let full = repo.get(created.uuid, &query).await.unwrap();
        assert_eq!(full, created);
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        let err = repo.get(Uuid::new_v4(), &ResourceQuery::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn pagination_bounds_page_but_not_total() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        for i in 0..5 {
            repo.create(project(&format!("p{}", i))).await.unwrap();
        }
        for (limit, offset, expected) in [(2, 0, 2), (2, 4, 1), (0, 0, 5), (10, 0, 5)] {
            let page = repo
                .list(&CollectionQuery {
                    limit,
                    offset,
                    expand: vec![],
                })
                .await
                .unwrap();
            assert_eq!(page.items.len(), expected, "limit={} offset={}", limit, offset);
            assert_eq!(page.total, 5);
        }
    }

    #[tokio::test]
    async fn page_past_the_end_has_no_total() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        for i in 0..3 {
            repo.create(project(&format!("p{}", i))).await.unwrap();
        }
        let page = repo
            .list(&CollectionQuery {
                limit: 2,
                offset: 10,
                expand: vec![],
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn empty_table_lists_nothing() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        let page = repo
            .list(&CollectionQuery {
                limit: 0,
                offset: 0,
                expand: vec![],
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        let created = repo.create(project("x")).await.unwrap();
        repo.delete(created.uuid).await.unwrap();
        assert!(matches!(
            repo.get(created.uuid, &ResourceQuery::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_is_unsupported() {
        let repo = MemoryRepository::<Project>::new().unwrap();
        let err = repo.update(Uuid::new_v4(), project("x")).await.unwrap_err();
        assert!(matches!(err, AppError::Unsupported("update")));
    }
}
