pub mod admin;
pub mod auth;
pub mod feed;
pub mod input;
pub mod instructor;
pub mod middleware;
pub mod password;
pub mod reply;
pub mod rest;
pub mod session;
pub mod state;
pub mod student;
pub mod token;

pub use middleware::require_session;
pub use state::AppState;

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the full API router: one nested router per role plus the JSON 404 and 405 fallbacks.
pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    Router::new()
        .nest("/api/admin", admin::router(state.clone()))
        .nest("/api/instructor", instructor::router(state.clone()))
        .nest("/api/student", student::router(state.clone()))
        .method_not_allowed_fallback(rest::method_not_allowed_handler)
        .fallback(rest::fallback_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
