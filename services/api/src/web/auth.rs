//! services/api/src/web/auth.rs
//!
//! Session endpoints shared by every role: login, session check, logout and
//! password change. The role comes from the `SessionPolicy` extension that
//! each role router installs.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use portal_core::{ports::PortError, Principal};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::{
    input::{read_body, required},
    password::{hash_password, verify_password},
    reply::{Empty, Reply},
    session::{CurrentPrincipal, SessionPolicy},
    state::AppState,
    token::Claims,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// `{"<role>": {public fields}, "role": "<role>"}`
fn session_payload(principal: &Principal) -> Result<Map<String, Value>, ApiError> {
    let profile = serde_json::to_value(principal.profile())
        .map_err(|e| ApiError::Internal(format!("Failed to serialize principal: {}", e)))?;

    let mut payload = Map::new();
    payload.insert(principal.role.as_str().to_string(), profile);
    payload.insert(
        "role".to_string(),
        Value::String(principal.role.as_str().to_string()),
    );
    Ok(payload)
}

fn secure_cookies(state: &AppState) -> bool {
    !state.config.environment.is_development()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /login - Exchange email and password for a session cookie
#[utoipa::path(
    post,
    path = "/api/{role}/login",
    request_body = LoginRequest,
    params(("role" = String, Path, description = "admin, instructor or student")),
    responses(
        (status = 200, description = "Login successful; session cookie set"),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Extension(policy): Extension<SessionPolicy>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = read_body(body)?;
    let (Some(email), Some(password)) = (required(req.email), required(req.password)) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    // 1. Get the principal by email
    let principal = match state.db.find_principal_by_email(policy.role, &email).await {
        Ok(principal) => principal,
        Err(PortError::NotFound(_)) => {
            info!(role = %policy.role, "Login attempt for unknown email");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Verify password
    if !verify_password(&password, &principal.password_hash)? {
        info!(role = %policy.role, principal_id = %principal.id, "Login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    // 3. Mint the session token
    let claims = Claims::new(principal.id, policy.role, Utc::now());
    let token = state.tokens.sign(&claims).map_err(|e| {
        error!("Failed to sign session token: {:?}", e);
        ApiError::Internal("Failed to create session".to_string())
    })?;
    let cookie = policy.session_cookie(&token, secure_cookies(&state));

    info!(role = %policy.role, principal_id = %principal.id, "Login successful");
    let reply = Reply::success(session_payload(&principal)?).with_message("Login successful");
    Ok(([(header::SET_COOKIE, cookie)], reply))
}

/// GET /check-session - Report the principal behind the session cookie
#[utoipa::path(
    get,
    path = "/api/{role}/check-session",
    params(("role" = String, Path, description = "admin, instructor or student")),
    responses(
        (status = 200, description = "Session is valid"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn check_session_handler(
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
) -> Result<Reply<Map<String, Value>>, ApiError> {
    Ok(Reply::success(session_payload(&principal)?))
}

/// POST /logout - Clear the session cookie
///
/// The token itself stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/{role}/logout",
    params(("role" = String, Path, description = "admin, instructor or student")),
    responses((status = 200, description = "Logout successful"))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(policy): Extension<SessionPolicy>,
) -> impl IntoResponse {
    let cookie = policy.cleared_cookie(secure_cookies(&state));
    (
        [(header::SET_COOKIE, cookie)],
        Reply::message("Logout successful"),
    )
}

/// POST /change-password - Replace the caller's password
#[utoipa::path(
    post,
    path = "/api/{role}/change-password",
    request_body = ChangePasswordRequest,
    params(("role" = String, Path, description = "admin, instructor or student")),
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Old or new password missing"),
        (status = 401, description = "Old password is wrong or no session")
    )
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(principal)): Extension<CurrentPrincipal>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Reply<Empty>, ApiError> {
    let req = read_body(body)?;
    let (Some(old_password), Some(new_password)) =
        (required(req.old_password), required(req.new_password))
    else {
        return Err(ApiError::BadRequest(
            "Old and new passwords are required".to_string(),
        ));
    };

    if !verify_password(&old_password, &principal.password_hash)? {
        return Err(ApiError::Unauthorized("Old password is incorrect"));
    }

    let new_hash = hash_password(&new_password)?;
    state
        .db
        .set_password_hash(principal.role, principal.id, &new_hash)
        .await?;

    info!(role = %principal.role, principal_id = %principal.id, "Password changed");
    Ok(Reply::message("Password changed"))
}

