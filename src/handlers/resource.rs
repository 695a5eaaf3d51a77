//! CRUD handlers generic over the entity type: parse, call the service, render the envelope.

use super::query::{collection_query, meta_query, resource_query};
use crate::entity::Entity;
use crate::error::AppError;
use crate::repository::ResourceQuery;
use crate::response::EnvelopeWriter;
use crate::state::ResourceState;
use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, StatusCode},
    Form, Json,
};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid id '{}'", raw)))
}

enum BodyKind {
    Json,
    Form,
}

fn body_kind(req: &Request) -> Result<BodyKind, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if mime == "application/json" || mime.ends_with("+json") {
        Ok(BodyKind::Json)
    } else if mime == "application/x-www-form-urlencoded" {
        Ok(BodyKind::Form)
    } else {
        Err(AppError::UnsupportedMediaType(if mime.is_empty() {
            "missing content type".into()
        } else {
            format!("unsupported content type '{}'", mime)
        }))
    }
}

/// Decodes a JSON or form-urlencoded body into `T`.
async fn decode_body<T: Entity>(req: Request) -> Result<T, AppError> {
    match body_kind(&req)? {
        BodyKind::Json => {
            let Json(record) = Json::<T>::from_request(req, &())
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(record)
        }
        BodyKind::Form => {
            let Form(record) = Form::<T>::from_request(req, &())
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(record)
        }
    }
}

pub async fn get_one<T: Entity>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let query = resource_query(&params);
    let meta = meta_query(&params);
    let record = state.service.get(id, &query).await?;
    let body = EnvelopeWriter::new(state.service.model(), &state.base_path).write_resource(&record, &query, &meta)?;
    Ok(Json(body))
}

pub async fn list<T: Entity>(
    State(state): State<ResourceState<T>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let query = collection_query(&params)?;
    let meta = meta_query(&params);
    let page = state.service.list(&query).await?;
    let body = EnvelopeWriter::new(state.service.model(), &state.base_path).write_collection(&page, &query, &meta)?;
    Ok(Json(body))
}

/// POST: JSON or form body. The stored record is returned with every field expanded.
pub async fn create<T: Entity>(
    State(state): State<ResourceState<T>>,
    Query(params): Query<HashMap<String, String>>,
    req: Request,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let meta = meta_query(&params);
    let record: T = decode_body(req).await?;
    let created = state.service.create(record).await?;
    let model = state.service.model();
    let query = ResourceQuery {
        expand: model.expandable_wire_names(),
    };
    let body = EnvelopeWriter::new(model, &state.base_path).write_resource(&created, &query, &meta)?;
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn update<T: Entity>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    req: Request,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let meta = meta_query(&params);
    let record: T = decode_body(req).await?;
    let updated = state.service.update(id, record).await?;
    let query = resource_query(&params);
    let body = EnvelopeWriter::new(state.service.model(), &state.base_path).write_resource(&updated, &query, &meta)?;
    Ok(Json(body))
}

pub async fn delete<T: Entity>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
