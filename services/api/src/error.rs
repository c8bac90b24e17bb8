//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is rendered to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portal_core::ports::PortError;
use tracing::error;

use crate::config::ConfigError;
use crate::web::reply::Reply;

/// Message sent for invalid logins, whether the email or the password was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

const SERVER_ERROR: &str = "Internal server error";

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required input was missing or malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or expired session, or the principal is gone.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The referenced document does not exist.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the store port.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Unauthorized(message) | ApiError::NotFound(message) => message.to_string(),
            ApiError::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            _ => SERVER_ERROR.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        Reply::error(status, self.client_message()).into_response()
    }
}

/// Maps a store `NotFound` onto a client-facing 404 with a fixed message.
pub trait OrNotFound<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> OrNotFound<T> for Result<T, PortError> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| match e {
            PortError::NotFound(_) => ApiError::NotFound(message),
            other => ApiError::Port(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn server_errors_hide_their_cause() {
        let (status, body) =
            body_of(ApiError::Port(PortError::Unexpected("connection reset".into()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let (status, body) = body_of(ApiError::NotFound("Class not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Class not found");

        let (status, body) = body_of(ApiError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], INVALID_CREDENTIALS);
    }

    #[test]
    fn store_not_found_maps_to_the_given_message() {
        let result: Result<(), PortError> = Err(PortError::NotFound("row".into()));
        let err = result.or_not_found("Student not found").unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Student not found")));

        let result: Result<(), PortError> = Err(PortError::Unexpected("boom".into()));
        let err = result.or_not_found("Student not found").unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
