//! Typed errors and HTTP mapping.

use crate::entity::SqlType;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Entity shape rejected while deriving its model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{entity}: field '{field}' has no wire name")]
    MissingWireName { entity: &'static str, field: &'static str },
    #[error("{entity}: wire name '{wire_name}' is used by more than one field")]
    DuplicateWireName { entity: &'static str, wire_name: &'static str },
    #[error("{entity}: wire name '{wire_name}' is reserved for response metadata")]
    ReservedWireName { entity: &'static str, wire_name: &'static str },
    #[error("{entity}: column '{column}' is derived from more than one field")]
    DuplicateColumn { entity: &'static str, column: String },
    #[error("{entity}: no primary key field")]
    MissingPrimaryKey { entity: &'static str },
    #[error("{entity}: more than one primary key field")]
    MultiplePrimaryKeys { entity: &'static str },
    #[error("{entity}: primary key '{field}' must be a Uuid, persisted and not expandable")]
    InvalidPrimaryKey { entity: &'static str, field: &'static str },
    #[error("{entity}: unsupported type {type_name} for field '{field}'")]
    UnsupportedType {
        entity: &'static str,
        field: &'static str,
        type_name: &'static str,
    },
    #[error("{entity}: '{name}' is not a valid SQL identifier")]
    InvalidIdentifier { entity: &'static str, name: String },
    #[error("{entity}: no fields selected")]
    EmptyFieldSet { entity: &'static str },
}

/// Value could not be moved between a record field and a column.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("{entity} has no persisted field '{field}'")]
    UnknownField { entity: &'static str, field: String },
    #[error("type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch { expected: SqlType, found: SqlType },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("storage: {0}")]
    Storage(String),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // No dedicated "not implemented" mapping yet.
            AppError::Unsupported(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Schema(_)
            | AppError::Entity(_)
            | AppError::Db(_)
            | AppError::Storage(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Schema(_) => "schema_error",
            AppError::Entity(_) => "entity_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::UnsupportedMediaType(_) => "unsupported_media_type",
            AppError::NotFound(_) => "not_found",
            AppError::Unsupported(_) => "unsupported_operation",
            AppError::Db(_) | AppError::Storage(_) => "query_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        // Client errors echo their detail; storage and serialization detail stays in the log.
        let message = match &self {
            AppError::BadRequest(_)
            | AppError::UnsupportedMediaType(_)
            | AppError::NotFound(_)
            | AppError::Unsupported(_) => self.to_string(),
            _ => {
                tracing::error!(error = %self, code, "request failed");
                "internal server error".to_string()
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UnsupportedMediaType("text/plain".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(AppError::Unsupported("update").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Db(sqlx::Error::RowNotFound).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
