use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;
use crate::storage::StorageError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthenticated => ApiError::unauthorized("Authentication required"),
            Error::NotAuthorized => ApiError::forbidden("Admin access required"),
            Error::NotAMember | Error::NotFound => ApiError::not_found("Not found"),
            Error::Validation(message) => ApiError::bad_request(message),
            Error::KeyMismatch => ApiError::bad_request(Error::KeyMismatch.to_string()),
            Error::Conflict(message) => ApiError::conflict(message),
            Error::LastAdminGuard => ApiError::conflict(Error::LastAdminGuard.to_string()),
            Error::StorageUnconfigured => {
                ApiError::service_unavailable(Error::StorageUnconfigured.to_string())
            }
            Error::Storage(StorageError::NotFound) => ApiError::not_found("Object not found"),
            Error::Storage(StorageError::InvalidKey) => ApiError::bad_request("Invalid file key"),
            Error::Storage(StorageError::InvalidSignature | StorageError::Expired) => {
                ApiError::forbidden("Invalid or expired signature")
            }
            other => {
                tracing::error!("Request failed: {}", other);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::from(Error::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
