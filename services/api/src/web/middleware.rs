//! services/api/src/web/middleware.rs
//!
//! The session guard protecting every role's private routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use portal_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::web::session::{CurrentPrincipal, SessionPolicy};
use crate::web::state::AppState;

/// State handed to [`require_session`]: the app plus the policy of the role
/// the guarded router belongs to.
#[derive(Clone)]
pub struct SessionGuard {
    pub app: Arc<AppState>,
    pub policy: SessionPolicy,
}

impl SessionGuard {
    pub fn new(app: Arc<AppState>, policy: SessionPolicy) -> Self {
        Self { app, policy }
    }
}

/// Middleware that validates the role's session cookie and resolves its principal.
///
/// If valid, inserts a [`CurrentPrincipal`] into request extensions for handlers to use.
/// If missing, invalid, expired, or the principal no longer exists, returns 401.
pub async fn require_session(
    State(guard): State<SessionGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let policy = guard.policy;

    // 1. Extract the token from the role's cookie
    let token = policy
        .token_from(req.headers())
        .ok_or(ApiError::Unauthorized("Access denied: no session token"))?;

    // 2. Verify signature and expiry
    let claims = guard.app.tokens.verify(token).map_err(|e| {
        debug!(cookie = policy.cookie_name, "Rejected session token: {}", e);
        ApiError::Unauthorized("Invalid or expired session token")
    })?;
    if claims.role != policy.role {
        warn!(
            expected = %policy.role,
            found = %claims.role,
            "Session token minted for another role"
        );
        return Err(ApiError::Unauthorized("Invalid or expired session token"));
    }

    // 3. Resolve the principal
    let principal = guard
        .app
        .db
        .find_principal_by_id(policy.role, claims.sub)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiError::Unauthorized("Account no longer exists"),
            other => ApiError::Port(other),
        })?;

    // 4. Attach it and continue
    req.extensions_mut().insert(CurrentPrincipal(principal));
    Ok(next.run(req).await)
}
