use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for {field}")]
    DuplicateKey { field: &'static str },

    #[error("referenced user does not exist")]
    MissingOwner,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                // users.email is the only unique column reachable from a write path
                return StoreError::DuplicateKey { field: "email" };
            }
            if db.is_foreign_key_violation() {
                return StoreError::MissingOwner;
            }
        }
        StoreError::Backend(e.into())
    }
}

/// One entry of the `errors` array in an error response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: &str, msg: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            msg: msg.into(),
        }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self {
            field: None,
            msg: msg.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("duplicate key: {}", .0.msg)]
    DuplicateKey(FieldError),

    #[error("{0}")]
    NoRecord(String),

    #[error("not found: {}", .0.msg)]
    NotFound(FieldError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateKey(_)
            | ApiError::NoRecord(_)
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_errors(self) -> Vec<FieldError> {
        match self {
            ApiError::Validation(errors) => errors,
            ApiError::DuplicateKey(e) | ApiError::NotFound(e) => vec![e],
            ApiError::NoRecord(msg) | ApiError::Unauthorized(msg) => vec![FieldError::general(msg)],
            ApiError::InvalidCredentials => vec![FieldError::new("password", "Password incorrect")],
            ApiError::Internal(_) => vec![FieldError::general("Server Error")],
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey { field } => {
                ApiError::DuplicateKey(FieldError::new(field, "Email already exists"))
            }
            StoreError::MissingOwner => ApiError::NotFound(FieldError::general("User not found")),
            StoreError::Backend(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldError::general(r.body_text())])
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        ApiError::Validation(vec![FieldError::general(r.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(e) = &self {
            error!(error = ?e, "request failed");
        }
        (status, Json(ErrorBody { errors: self.into_errors() })).into_response()
    }
}
