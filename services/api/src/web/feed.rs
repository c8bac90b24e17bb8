//! services/api/src/web/feed.rs
//!
//! The notification feed shown to instructors and students.

use axum::{extract::State, Extension};
use portal_core::Notification;
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::{reply::Reply, session::CurrentPrincipal, state::AppState};

#[derive(Serialize)]
pub struct NotificationFeed {
    notifications: Vec<Notification>,
}

/// GET /notifications - Active notifications addressed to the caller, newest first
#[utoipa::path(
    get,
    path = "/api/{role}/notifications",
    params(("role" = String, Path, description = "instructor or student")),
    responses(
        (status = 200, description = "Notifications visible to the caller"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn notification_feed_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
) -> Result<Reply<NotificationFeed>, ApiError> {
    let notifications = state
        .db
        .list_notifications()
        .await?
        .into_iter()
        .filter(|n| n.is_visible_to(me.role, me.id))
        .collect();
    Ok(Reply::success(NotificationFeed { notifications }))
}
