//! HTTP handlers for resource CRUD.

pub mod query;
pub mod resource;
