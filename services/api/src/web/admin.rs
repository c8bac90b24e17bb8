//! services/api/src/web/admin.rs
//!
//! The admin surface: roster browsing and notification management.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use portal_core::{
    roster::{self, ClassDetail, InstructorDetail, StudentDetail},
    Class, Instructor, Notification, NotificationPatch, Student, TargetType,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, OrNotFound};
use crate::web::{
    auth::{change_password_handler, check_session_handler, login_handler, logout_handler},
    input::{parse_id, read_body, required},
    middleware::{require_session, SessionGuard},
    reply::{Empty, Reply},
    session::{CurrentPrincipal, SessionPolicy},
    state::AppState,
};

const STUDENT_NOT_FOUND: &str = "Student not found";
const CLASS_NOT_FOUND: &str = "Class not found";
const INSTRUCTOR_NOT_FOUND: &str = "Instructor not found";
const NOTIFICATION_NOT_FOUND: &str = "Notification not found";

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let policy = SessionPolicy::ADMIN;

    let protected = Router::new()
        .route("/check-session", get(check_session_handler))
        .route("/change-password", post(change_password_handler))
        .route("/students", get(list_students_handler))
        .route("/students/{id}", get(student_detail_handler))
        .route("/classes", get(list_classes_handler))
        .route("/classes/{id}", get(class_detail_handler))
        .route("/instructors", get(list_instructors_handler))
        .route("/instructors/{id}", get(instructor_detail_handler))
        .route(
            "/notifications",
            post(create_notification_handler).get(list_notifications_handler),
        )
        .route(
            "/notifications/{id}",
            put(update_notification_handler).delete(delete_notification_handler),
        )
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

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Serialize)]
pub struct StudentList {
    students: Vec<Student>,
}

#[derive(Serialize)]
pub struct ClassList {
    classes: Vec<Class>,
}

#[derive(Serialize)]
pub struct InstructorList {
    instructors: Vec<Instructor>,
}

#[derive(Serialize)]
pub struct NotificationList {
    notifications: Vec<Notification>,
}

#[derive(Serialize, ToSchema)]
pub struct NotificationCreated {
    notification_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateNotificationRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// One of `all`, `students`, `instructors`, `specific`.
    pub target_type: Option<String>,
    pub target_ids: Option<Vec<Uuid>>,
}

/// Every field is optional; only the ones present are written.
#[derive(Deserialize, ToSchema)]
pub struct UpdateNotificationRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub target_type: Option<String>,
    pub target_ids: Option<Vec<Uuid>>,
    pub is_active: Option<bool>,
}

fn parse_target_type(raw: &str) -> Result<TargetType, ApiError> {
    raw.parse::<TargetType>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

//=========================================================================================
// Roster Handlers
//=========================================================================================

/// GET /students - List every student
#[utoipa::path(
    get,
    path = "/api/admin/students",
    responses(
        (status = 200, description = "All students"),
        (status = 401, description = "No valid admin session")
    )
)]
pub async fn list_students_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Reply<StudentList>, ApiError> {
    let students = state.db.list_students().await?;
    Ok(Reply::success(StudentList { students }))
}

/// GET /students/{id} - A student with their academic records
#[utoipa::path(
    get,
    path = "/api/admin/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student and academic records"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn student_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Reply<StudentDetail>, ApiError> {
    let student_id = parse_id(&id, STUDENT_NOT_FOUND)?;
    let detail = roster::student_detail(state.db.as_ref(), student_id)
        .await
        .or_not_found(STUDENT_NOT_FOUND)?;
    Ok(Reply::success(detail))
}

/// GET /classes - List every class
#[utoipa::path(
    get,
    path = "/api/admin/classes",
    responses((status = 200, description = "All classes"))
)]
pub async fn list_classes_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Reply<ClassList>, ApiError> {
    let classes = state.db.list_classes().await?;
    Ok(Reply::success(ClassList { classes }))
}

/// GET /classes/{id} - A class with its enrolled students and instructor
#[utoipa::path(
    get,
    path = "/api/admin/classes/{id}",
    params(("id" = String, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class, students and instructor"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn class_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Reply<ClassDetail>, ApiError> {
    let class_id = parse_id(&id, CLASS_NOT_FOUND)?;
    let detail = roster::class_detail(state.db.as_ref(), class_id)
        .await
        .or_not_found(CLASS_NOT_FOUND)?;
    Ok(Reply::success(detail))
}

/// GET /instructors - List every instructor
#[utoipa::path(
    get,
    path = "/api/admin/instructors",
    responses((status = 200, description = "All instructors"))
)]
pub async fn list_instructors_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Reply<InstructorList>, ApiError> {
    let instructors = state.db.list_instructors().await?;
    Ok(Reply::success(InstructorList { instructors }))
}

/// GET /instructors/{id} - An instructor with the classes they teach
#[utoipa::path(
    get,
    path = "/api/admin/instructors/{id}",
    params(("id" = String, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Instructor and classes"),
        (status = 404, description = "Instructor not found")
    )
)]
pub async fn instructor_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Reply<InstructorDetail>, ApiError> {
    let instructor_id = parse_id(&id, INSTRUCTOR_NOT_FOUND)?;
    let detail = roster::instructor_detail(state.db.as_ref(), instructor_id)
        .await
        .or_not_found(INSTRUCTOR_NOT_FOUND)?;
    Ok(Reply::success(detail))
}

//=========================================================================================
// Notification Handlers
//=========================================================================================

/// POST /notifications - Publish a notification
#[utoipa::path(
    post,
    path = "/api/admin/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = NotificationCreated),
        (status = 400, description = "Title, content or target type missing or invalid")
    )
)]
pub async fn create_notification_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(admin)): Extension<CurrentPrincipal>,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<Reply<NotificationCreated>, ApiError> {
    let req = read_body(body)?;
    let (Some(title), Some(content), Some(target_type)) = (
        required(req.title),
        required(req.content),
        required(req.target_type),
    ) else {
        return Err(ApiError::BadRequest(
            "Title, content and target type are required".to_string(),
        ));
    };

    let notification = Notification {
        id: Uuid::new_v4(),
        title,
        content,
        target_type: parse_target_type(&target_type)?,
        target_ids: req.target_ids.unwrap_or_default(),
        created_at: Utc::now(),
        created_by: admin.id,
        is_active: true,
        updated_at: None,
    };
    let notification_id = notification.id;
    state.db.insert_notification(notification).await?;

    info!(%notification_id, admin_id = %admin.id, "Notification created");
    Ok(Reply::success(NotificationCreated { notification_id })
        .with_status(StatusCode::CREATED)
        .with_message("Notification created"))
}

/// GET /notifications - Every notification, newest first
#[utoipa::path(
    get,
    path = "/api/admin/notifications",
    responses((status = 200, description = "All notifications"))
)]
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Reply<NotificationList>, ApiError> {
    let notifications = state.db.list_notifications().await?;
    Ok(Reply::success(NotificationList { notifications }))
}

/// PUT /notifications/{id} - Partially update a notification
#[utoipa::path(
    put,
    path = "/api/admin/notifications/{id}",
    request_body = UpdateNotificationRequest,
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification updated"),
        (status = 400, description = "Invalid target type on an existing notification"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn update_notification_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateNotificationRequest>, JsonRejection>,
) -> Result<Reply<Empty>, ApiError> {
    let notification_id = parse_id(&id, NOTIFICATION_NOT_FOUND)?;
    let req = read_body(body)?;

    let target_type = match req.target_type.as_deref().map(parse_target_type).transpose() {
        Ok(target_type) => target_type,
        Err(invalid) => {
            // A missing notification is reported before a bad target type.
            state
                .db
                .get_notification(notification_id)
                .await
                .or_not_found(NOTIFICATION_NOT_FOUND)?;
            return Err(invalid);
        }
    };

    let patch = NotificationPatch {
        title: req.title,
        content: req.content,
        target_type,
        target_ids: req.target_ids,
        is_active: req.is_active,
    };

    state
        .db
        .update_notification(notification_id, patch, Utc::now())
        .await
        .or_not_found(NOTIFICATION_NOT_FOUND)?;

    info!(%notification_id, "Notification updated");
    Ok(Reply::message("Notification updated"))
}

/// DELETE /notifications/{id} - Remove a notification for good
#[utoipa::path(
    delete,
    path = "/api/admin/notifications/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Reply<Empty>, ApiError> {
    let notification_id = parse_id(&id, NOTIFICATION_NOT_FOUND)?;
    state
        .db
        .delete_notification(notification_id)
        .await
        .or_not_found(NOTIFICATION_NOT_FOUND)?;

    info!(%notification_id, "Notification deleted");
    Ok(Reply::message("Notification deleted"))
}
