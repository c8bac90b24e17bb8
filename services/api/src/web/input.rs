//! services/api/src/web/input.rs
//!
//! Request input helpers shared by the handlers.

use axum::{extract::rejection::JsonRejection, Json};
use uuid::Uuid;

use crate::error::ApiError;

/// Unwraps a JSON body, turning any rejection into a 400 in the usual envelope.
pub fn read_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Parses a path id. Malformed ids can never match a document, so they
/// produce the caller's 404 message.
pub fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(not_found))
}

/// A required string field: absent or blank counts as missing.
pub fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
