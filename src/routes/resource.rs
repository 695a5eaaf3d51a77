//! CRUD routes for one entity, to be nested at its base path.

use crate::entity::Entity;
use crate::handlers::resource::{create, delete, get_one, list, update};
use crate::service::GenericService;
use crate::state::ResourceState;
use axum::{routing::get, Router};

/// `GET /` list, `POST /` create, `GET|PATCH|DELETE /:id`.
///
/// `base_path` is the absolute path the router is nested at; it is only used to build links.
pub fn resource_routes<T: Entity>(service: GenericService<T>, base_path: &str) -> Router {
    let state = ResourceState {
        service,
        base_path: base_path.trim_end_matches('/').into(),
    };
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/:id", get(get_one::<T>).patch(update::<T>).delete(delete::<T>))
        .with_state(state)
}
