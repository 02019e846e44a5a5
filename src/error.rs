//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Fatal wiring mistakes: missing registrations, broken view configs.
/// Raised at the point of first use, never silently defaulted.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("repository '{0}' is not registered")]
    UnregisteredRepository(String),
    #[error("unknown project prefix '{0}'")]
    UnknownProject(String),
    #[error("unknown admin entity '{0}'")]
    UnknownAdmin(String),
    #[error("duplicate column key '{0}' in list view config")]
    DuplicateColumnKey(String),
    #[error("per_page must be positive")]
    InvalidPerPage,
    #[error("route '{0}' is not in the route table")]
    UnknownRoute(String),
    #[error("route '{route}' is missing parameter '{param}'")]
    MissingRouteParam { route: String, param: String },
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("storage: {0}")]
    Storage(String),
    #[error("password hash: {0}")]
    PasswordHash(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AdminError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AdminError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AdminError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AdminError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AdminError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            AdminError::PasswordHash(_) => (StatusCode::INTERNAL_SERVER_ERROR, "hash_error"),
            AdminError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AdminError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
