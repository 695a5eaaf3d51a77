//! Serves the bundled models as REST resources.
//!
//! Reads settings from the environment (see `Settings::from_env`), creates missing tables, then listens.

use axum::Router;
use resource_sdk::models::{Project, Status, Task, TaskType, User};
use resource_sdk::schema::naming::table_name;
use resource_sdk::{common_routes_with_ready, connect, resource_routes, AppError, Entity, GenericService, PgRepository, Settings};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

/// Creates the table for `T` if missing and nests its routes at `/<version>/<table>`.
async fn mount<T: Entity>(app: Router, pool: &PgPool, settings: &Settings) -> Result<Router, AppError> {
    let repository = PgRepository::<T>::new(pool.clone())?;
    repository.ensure_table().await?;
    let base_path = settings.base_path(&table_name(T::TYPE_NAME));
    tracing::info!(entity = T::TYPE_NAME, path = %base_path, "mounted");
    let service = GenericService::new(Arc::new(repository));
    Ok(app.nest(&base_path, resource_routes::<T>(service, &base_path)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resource_sdk=info,resource_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let pool = connect(&settings).await?;

    // projects before tasks: tasks.project_id references projects
    let mut app = Router::new();
    app = mount::<Project>(app, &pool, &settings).await?;
    app = mount::<Status>(app, &pool, &settings).await?;
    app = mount::<TaskType>(app, &pool, &settings).await?;
    app = mount::<Task>(app, &pool, &settings).await?;
    app = mount::<User>(app, &pool, &settings).await?;

    let app = app
        .merge(common_routes_with_ready(pool))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
                .layer(TimeoutLayer::new(settings.request_timeout)),
        );

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
