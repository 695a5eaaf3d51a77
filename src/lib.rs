//! Resource SDK: typed REST resources over PostgreSQL, derived from declarative entity descriptors.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use entity::{Entity, FieldDef, FieldType, SqlType, SqlValue};
pub use error::{AppError, ConfigError, EntityError, SchemaError};
pub use repository::{CollectionQuery, MemoryRepository, Page, PgRepository, Repository, ResourceQuery};
pub use response::{EnvelopeWriter, MetaQuery, MetaSection};
pub use routes::{common_routes, common_routes_with_ready, resource_routes};
pub use schema::{EntityModel, TableSchema};
pub use service::GenericService;
pub use settings::Settings;
pub use state::ResourceState;
pub use store::connect;
