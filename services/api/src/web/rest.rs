//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the fallback
//! handlers for unknown paths and unsupported methods.

use axum::extract::OriginalUri;
use axum::http::{Method, StatusCode, Uri};
use utoipa::OpenApi;

use crate::web::{
    admin, auth, feed, instructor,
    reply::{Empty, Reply},
    student,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::check_session_handler,
        auth::logout_handler,
        auth::change_password_handler,
        admin::list_students_handler,
        admin::student_detail_handler,
        admin::list_classes_handler,
        admin::class_detail_handler,
        admin::list_instructors_handler,
        admin::instructor_detail_handler,
        admin::create_notification_handler,
        admin::list_notifications_handler,
        admin::update_notification_handler,
        admin::delete_notification_handler,
        instructor::profile_handler,
        instructor::my_classes_handler,
        instructor::class_roster_handler,
        instructor::update_grades_handler,
        student::profile_handler,
        student::academic_records_handler,
        student::curriculum_handler,
        student::scholarships_handler,
        feed::notification_feed_handler,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::ChangePasswordRequest,
            admin::CreateNotificationRequest,
            admin::UpdateNotificationRequest,
            admin::NotificationCreated,
            instructor::UpdateGradesRequest,
        )
    ),
    tags(
        (name = "Student Portal API", description = "Academic records, rosters and notifications for admins, instructors and students.")
    )
)]
pub struct ApiDoc;

/// Answers unknown paths with a 404 in the usual envelope.
pub async fn fallback_handler(path: Uri) -> Reply<Empty> {
    Reply::error(StatusCode::NOT_FOUND, format!("Invalid path: {}", path))
}

/// Answers a known path called with the wrong method with a 405 in the usual envelope.
pub async fn method_not_allowed_handler(
    method: Method,
    OriginalUri(path): OriginalUri,
) -> Reply<Empty> {
    Reply::error(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {} not allowed on {}", method, path),
    )
}
