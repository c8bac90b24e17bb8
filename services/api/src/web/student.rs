//! services/api/src/web/student.rs
//!
//! The student surface: profile, academic records with computed summary,
//! curriculum, notifications and scholarships.

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use portal_core::{
    academics::{self, AcademicSummary},
    AcademicRecord, ProgramSubject, Scholarship, Student,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ApiError, OrNotFound};
use crate::web::{
    auth::{change_password_handler, check_session_handler, login_handler, logout_handler},
    feed::notification_feed_handler,
    middleware::{require_session, SessionGuard},
    reply::Reply,
    session::{CurrentPrincipal, SessionPolicy},
    state::AppState,
};

const STUDENT_NOT_FOUND: &str = "Student not found";

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let policy = SessionPolicy::STUDENT;

    let protected = Router::new()
        .route("/check-session", get(check_session_handler))
        .route("/change-password", post(change_password_handler))
        .route("/profile", get(profile_handler))
        .route("/academic-records", get(academic_records_handler))
        .route("/curriculum", get(curriculum_handler))
        .route("/notifications", get(notification_feed_handler))
        .route("/scholarships", get(scholarships_handler))
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
pub struct StudentProfile {
    student: Student,
}

#[derive(Serialize)]
pub struct AcademicHistory {
    #[serde(rename = "academicRecords")]
    academic_records: Vec<AcademicRecord>,
    summary: AcademicSummary,
}

#[derive(Serialize)]
pub struct Curriculum {
    major: String,
    curriculum: BTreeMap<String, Vec<ProgramSubject>>,
}

#[derive(Serialize)]
pub struct ScholarshipList {
    scholarships: Vec<Scholarship>,
}

/// GET /profile - The calling student's record
#[utoipa::path(
    get,
    path = "/api/student/profile",
    operation_id = "student_profile",
    responses(
        (status = 200, description = "Student profile"),
        (status = 404, description = "Student record missing")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
) -> Result<Reply<StudentProfile>, ApiError> {
    let student = state
        .db
        .get_student(me.id)
        .await
        .or_not_found(STUDENT_NOT_FOUND)?;
    Ok(Reply::success(StudentProfile { student }))
}

/// GET /academic-records - Semester results with credit and average summary
#[utoipa::path(
    get,
    path = "/api/student/academic-records",
    responses((status = 200, description = "Academic records and summary"))
)]
pub async fn academic_records_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
) -> Result<Reply<AcademicHistory>, ApiError> {
    let academic_records = state.db.list_academic_records(me.id).await?;
    let summary = academics::summarize(&academic_records);
    Ok(Reply::success(AcademicHistory {
        academic_records,
        summary,
    }))
}

/// GET /curriculum - The program of the student's major, grouped by category
#[utoipa::path(
    get,
    path = "/api/student/curriculum",
    responses(
        (status = 200, description = "Curriculum grouped by category"),
        (status = 404, description = "No major on record or no program for it")
    )
)]
pub async fn curriculum_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentPrincipal(me)): Extension<CurrentPrincipal>,
) -> Result<Reply<Curriculum>, ApiError> {
    let student = state
        .db
        .get_student(me.id)
        .await
        .or_not_found(STUDENT_NOT_FOUND)?;
    let major = student
        .major
        .ok_or(ApiError::NotFound("No major on record for this student"))?;
    let program = state
        .db
        .get_program(&major)
        .await
        .or_not_found("No curriculum found for this major")?;

    Ok(Reply::success(Curriculum {
        major,
        curriculum: academics::group_by_category(program.subjects),
    }))
}

/// GET /scholarships - Scholarship announcements, newest first
#[utoipa::path(
    get,
    path = "/api/student/scholarships",
    responses((status = 200, description = "All scholarships"))
)]
pub async fn scholarships_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Reply<ScholarshipList>, ApiError> {
    let scholarships = state.db.list_scholarships().await?;
    Ok(Reply::success(ScholarshipList { scholarships }))
}
