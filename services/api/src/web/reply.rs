//! services/api/src/web/reply.rs
//!
//! The JSON envelope every endpoint answers with:
//! `{"status": "success" | "error", "message"?: ..., ...payload}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Payload for replies that carry nothing beyond status and message.
#[derive(Debug, Clone, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten)]
    payload: T,
}

/// An enveloped response with its HTTP status.
#[derive(Debug)]
pub struct Reply<T> {
    code: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> Reply<T> {
    pub fn success(payload: T) -> Self {
        Self {
            code: StatusCode::OK,
            envelope: Envelope {
                status: Status::Success,
                message: None,
                payload,
            },
        }
    }

    pub fn with_status(mut self, code: StatusCode) -> Self {
        self.code = code;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }
}

impl Reply<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Reply::success(Empty {}).with_message(message)
    }

    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            envelope: Envelope {
                status: Status::Error,
                message: Some(message.into()),
                payload: Empty {},
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self.envelope)).into_response()
    }
}
