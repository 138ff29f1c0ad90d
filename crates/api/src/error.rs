//! API Error Responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use data_validator::ValidationError;
use feature_engine::AssemblyError;
use inference_engine::{InferenceError, PredictError};
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or invalid session token")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    AuthConflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Encoding(AssemblyError),

    #[error(transparent)]
    Inference(InferenceError),

    #[error(transparent)]
    Storage(StorageError),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AuthConflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(StorageError::UnknownTable(_)) => StatusCode::NOT_FOUND,
            ApiError::Inference(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::AuthConflict(_) => "auth_conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::Encoding(_) => "encoding_error",
            ApiError::Inference(_) => "inference_error",
            ApiError::Storage(StorageError::UnknownTable(_)) => "not_found",
            ApiError::Storage(_) => "storage_error",
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Storage(err)
    }
}

/// Undecodable request bodies report through the same envelope as field
/// validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![ValidationError::InvalidFormat(rejection.body_text())])
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Assembly(e) => ApiError::Encoding(e),
            PredictError::Inference(e) => ApiError::Inference(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let details = match &self {
            ApiError::Validation(errors) => errors.iter().map(ToString::to_string).collect(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::EncodingError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::AuthConflict("alice".to_string()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StorageError::UnknownTable("users".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StorageError::DatabaseError("locked".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_encoding_error_is_unprocessable() {
        let err = ApiError::from(PredictError::Assembly(AssemblyError::Encoding(EncodingError {
            column: "Offer".to_string(),
            value: "Offer Z".to_string(),
        })));

        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), "encoding_error");
        assert!(err.to_string().contains("Offer Z"));
    }
}
