//! Pass-through orchestration over a repository. Authorization, validation or caching would attach here.

use crate::entity::Entity;
use crate::error::AppError;
use crate::repository::{CollectionQuery, Page, Repository, ResourceQuery};
use crate::schema::EntityModel;
use std::sync::Arc;
use uuid::Uuid;

pub struct GenericService<T> {
    repository: Arc<dyn Repository<T>>,
}

impl<T> Clone for GenericService<T> {
    fn clone(&self) -> Self {
        GenericService {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<T: Entity> GenericService<T> {
    pub fn new(repository: Arc<dyn Repository<T>>) -> Self {
        GenericService { repository }
    }

    pub fn model(&self) -> &EntityModel {
        self.repository.model()
    }

    pub async fn get(&self, id: Uuid, query: &ResourceQuery) -> Result<T, AppError> {
        tracing::debug!(entity = T::TYPE_NAME, %id, expand = ?query.expand, "get");
        self.repository.get(id, query).await
    }

    pub async fn list(&self, query: &CollectionQuery) -> Result<Page<T>, AppError> {
        tracing::debug!(entity = T::TYPE_NAME, limit = query.limit, offset = query.offset, "list");
        self.repository.list(query).await
    }

    pub async fn create(&self, record: T) -> Result<T, AppError> {
        tracing::debug!(entity = T::TYPE_NAME, "create");
        self.repository.create(record).await
    }

    pub async fn update(&self, id: Uuid, record: T) -> Result<T, AppError> {
        tracing::debug!(entity = T::TYPE_NAME, %id, "update");
        self.repository.update(id, record).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        tracing::debug!(entity = T::TYPE_NAME, %id, "delete");
        self.repository.delete(id).await
    }
}
