//! services/api/src/web/instructor.rs
//!
//! The instructor surface: profile, own classes, grade entry and the
//! notification feed.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use portal_core::{
    roster::{self, ClassRoster},
    Class, Grades, Instructor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, OrNotFound};
use crate::web::{
    auth::{change_password_handler, check_session_handler, login_handler, logout_handler},
    feed::notification_feed_handler,
    input::{parse_id, read_body},
    middleware::{require_session, SessionGuard},
    reply::{Empty, Reply},
    session::{CurrentPrincipal, SessionPolicy},
    state::AppState,
};

const CLASS_NOT_FOUND: &str = "Class not found";
const ENROLLMENT_NOT_FOUND: &str = "Student is not enrolled in this class";

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let policy = SessionPolicy::INSTRUCTOR;

    let protected = Router::new()
        .route("/check-session", get(check_session_handler))
        .route("/change-password", post(change_password_handler))
        .route("/profile", get(profile_handler))
        .route("/classes", get(my_classes_handler))
        .route("/classes/{id}", get(class_roster_handler))
        .route(
            "/classes/{class_id}/students/{student_id}/grades",
            put(update_grades_handler),
        )
        .route("/notifications", get(notification_feed_handler))
        .route_layer(middleware::from_fn_with_state(
            SessionGuard::new(state, policy),
            require_session,
        ));

    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        .layer(Extension(policy))
}

#[derive(Serialize)]
pub struct InstructorProfile {
    instructor: Instructor,
}

#[derive(Serialize)]
pub struct ClassList {
    classes: Vec<Class>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateGradesRequest {
    /// Missing components are stored as null; at least one must be set.
    #[schema(value_type = Object)]
    pub grades: Option<Grades>,
}

/// Loads a class and checks that `instructor_id` teaches it. Classes taught
/// by someone else are reported as missing.
async fn owned_class(state: &AppState, class_id: Uuid, instructor_id: Uuid) -> Result<Class, ApiError> {
    let class = state
        .db
        .get_class(class_id)
        .await
        .or_not_found(CLASS_NOT_FOUND)?;
    if class.instructor_id != Some(instructor_id) {
        return Err(ApiError::NotFound(CLASS_NOT_FOUND));
    }
    Ok(class)
}

/// GET /profile - The calling instructor's record
#[utoipa::path(
    get,
    path = "/api/instructor/profile",
    operation_id = "instructor_profile",
    responses(
        (status = 200, description = "Instructor profile"),
        (status = 404, description = "Instructor record missing")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
) -> Result<Reply<InstructorProfile>, ApiError> {
    let instructor = state
        .db
        .get_instructor(me.id)
        .await
        .or_not_found("Instructor not found")?;
    Ok(Reply::success(InstructorProfile { instructor }))
}

/// GET /classes - Classes the caller teaches
#[utoipa::path(
    get,
    path = "/api/instructor/classes",
    responses((status = 200, description = "Classes taught by the caller"))
)]
pub async fn my_classes_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
) -> Result<Reply<ClassList>, ApiError> {
    let classes = state.db.list_classes_by_instructor(me.id).await?;
    Ok(Reply::success(ClassList { classes }))
}

/// GET /classes/{id} - One of the caller's classes with enrolled students and grades
#[utoipa::path(
    get,
    path = "/api/instructor/classes/{id}",
    params(("id" = String, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class roster with grades"),
        (status = 404, description = "Class not found or taught by someone else")
    )
)]
pub async fn class_roster_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
    Path(id): Path<String>,
) -> Result<Reply<ClassRoster>, ApiError> {
    let class_id = parse_id(&id, CLASS_NOT_FOUND)?;
    let class = owned_class(&state, class_id, me.id).await?;
    let roster = roster::class_roster(state.db.as_ref(), class).await?;
    Ok(Reply::success(roster))
}

/// PUT /classes/{class_id}/students/{student_id}/grades - Record a student's grades
#[utoipa::path(
    put,
    path = "/api/instructor/classes/{class_id}/students/{student_id}/grades",
    request_body = UpdateGradesRequest,
    params(
        ("class_id" = String, Path, description = "Class id"),
        ("student_id" = String, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Grades updated"),
        (status = 400, description = "Grades missing"),
        (status = 404, description = "Class not found or student not enrolled")
    )
)]
pub async fn update_grades_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
    Path((class_id, student_id)): Path<(String, String)>,
    body: Result<Json<UpdateGradesRequest>, JsonRejection>,
) -> Result<Reply<Empty>, ApiError> {
    let class_id = parse_id(&class_id, CLASS_NOT_FOUND)?;
    let student_id = parse_id(&student_id, ENROLLMENT_NOT_FOUND)?;
    let grades = read_body(body)?
        .grades
        .filter(|g| *g != Grades::default())
        .ok_or_else(|| ApiError::BadRequest("Grades are required".to_string()))?;

    owned_class(&state, class_id, me.id).await?;
    state
        .db
        .update_enrollment_grades(class_id, student_id, &grades)
        .await
        .or_not_found(ENROLLMENT_NOT_FOUND)?;

    info!(%class_id, %student_id, instructor_id = %me.id, "Grades updated");
    Ok(Reply::message("Grades updated"))
}
