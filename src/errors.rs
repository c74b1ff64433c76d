//! Maps domain failures onto the JSON error envelope.
//!
//! Every recognised failure renders as
//! `{"error": {"code": .., "message": .., "payload": ..}}` with a fixed status.
//! Anything else is an [`ApiError::Internal`] and goes out as a bare 500.

use crate::services::ServiceError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to list of problems with that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The `code` member of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Status(u16),
}

impl ErrorCode {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }
}

/// The closed set of errors the API knows how to present.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,

    #[error("{message}")]
    PermissionDenied { code: &'static str, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input.")]
    Validation(FieldErrors),

    #[error("Too many bunnies. Maximum allowed is {limit}")]
    CapacityExceeded { limit: i64 },

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct Envelope {
    error: EnvelopeBody,
}

#[derive(Serialize)]
struct EnvelopeBody {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl ApiError {
    pub fn permission_denied(code: &'static str, message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            code,
            message: message.into(),
        }
    }

    /// Single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation(errors)
    }

    /// Status code, `code` member and optional payload for recognised kinds.
    /// `None` for failures that must not be wrapped.
    fn envelope_parts(&self) -> Option<(StatusCode, ErrorCode, Option<Value>)> {
        match self {
            Self::AuthenticationRequired => Some((
                StatusCode::UNAUTHORIZED,
                ErrorCode::Text("not_authenticated".into()),
                None,
            )),
            Self::PermissionDenied { code, .. } => Some((
                StatusCode::FORBIDDEN,
                ErrorCode::Text((*code).to_string()),
                None,
            )),
            Self::NotFound(_) => Some((
                StatusCode::NOT_FOUND,
                ErrorCode::Status(StatusCode::NOT_FOUND.as_u16()),
                None,
            )),
            Self::Validation(fields) => Some((
                StatusCode::BAD_REQUEST,
                ErrorCode::Text("invalid".into()),
                serde_json::to_value(fields).ok(),
            )),
            Self::CapacityExceeded { .. } => {
                Some((StatusCode::BAD_REQUEST, ErrorCode::empty(), None))
            }
            Self::Internal(_) => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.envelope_parts() {
            Some((status, code, payload)) => {
                tracing::debug!(%status, "request failed: {}", self);
                let body = Envelope {
                    error: EnvelopeBody {
                        code,
                        message: self.to_string(),
                        payload,
                    },
                };
                (status, Json(body)).into_response()
            }
            None => {
                tracing::error!("unhandled failure: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} `{id}` not found"))
            }
            ServiceError::CapacityExceeded { limit } => ApiError::CapacityExceeded { limit },
            ServiceError::Forbidden(message) => ApiError::permission_denied("not_owner", message),
            ServiceError::DuplicateLocation(location) => ApiError::invalid(
                "location",
                format!("rabbit hole with location `{location}` already exists"),
            ),
            ServiceError::DuplicateUsername(username) => ApiError::invalid(
                "username",
                format!("user `{username}` already exists"),
            ),
            ServiceError::Sqlx(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid("path", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid("query", rejection.body_text())
    }
}
