//! Per-resource router state.

use crate::service::GenericService;
use std::sync::Arc;

/// Service for one entity plus the path it is mounted at (e.g. "/v1/tasks"), used for links.
pub struct ResourceState<T> {
    pub service: GenericService<T>,
    pub base_path: Arc<str>,
}

impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        ResourceState {
            service: self.service.clone(),
            base_path: Arc::clone(&self.base_path),
        }
    }
}
