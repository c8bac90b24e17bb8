//! crates/portal_core/src/ports.rs
//!
//! Defines the store contract the portal depends on. Handlers only ever see
//! this trait, so the backing store can be swapped without touching them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AcademicRecord, Class, Enrollment, Grades, Instructor, Notification, NotificationPatch,
    Principal, Program, Role, Scholarship, Student,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Principals ---
    /// Looks a principal up in the collection of `role`. Records without a
    /// password hash cannot log in and are reported as `NotFound`.
    async fn find_principal_by_email(&self, role: Role, email: &str) -> PortResult<Principal>;

    async fn find_principal_by_id(&self, role: Role, id: Uuid) -> PortResult<Principal>;

    async fn create_admin(
        &self,
        email: &str,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> PortResult<Principal>;

    async fn set_password_hash(&self, role: Role, id: Uuid, password_hash: &str) -> PortResult<()>;

    async fn set_password_hash_by_email(
        &self,
        role: Role,
        email: &str,
        password_hash: &str,
    ) -> PortResult<Uuid>;

    // --- Students ---
    async fn list_students(&self) -> PortResult<Vec<Student>>;

    async fn get_student(&self, student_id: Uuid) -> PortResult<Student>;

    /// Students whose id is in `ids`. Unknown ids are skipped.
    async fn find_students_by_ids(&self, ids: &[Uuid]) -> PortResult<Vec<Student>>;

    async fn list_academic_records(&self, student_id: Uuid) -> PortResult<Vec<AcademicRecord>>;

    // --- Instructors ---
    async fn list_instructors(&self) -> PortResult<Vec<Instructor>>;

    async fn get_instructor(&self, instructor_id: Uuid) -> PortResult<Instructor>;

    // --- Classes and Enrollments ---
    async fn list_classes(&self) -> PortResult<Vec<Class>>;

    async fn get_class(&self, class_id: Uuid) -> PortResult<Class>;

    async fn list_classes_by_instructor(&self, instructor_id: Uuid) -> PortResult<Vec<Class>>;

    async fn list_enrollments_for_class(&self, class_id: Uuid) -> PortResult<Vec<Enrollment>>;

    async fn update_enrollment_grades(
        &self,
        class_id: Uuid,
        student_id: Uuid,
        grades: &Grades,
    ) -> PortResult<()>;

    // --- Notifications ---
    async fn insert_notification(&self, notification: Notification) -> PortResult<()>;

    /// All notifications, newest first.
    async fn list_notifications(&self) -> PortResult<Vec<Notification>>;

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification>;

    async fn update_notification(
        &self,
        notification_id: Uuid,
        patch: NotificationPatch,
        updated_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn delete_notification(&self, notification_id: Uuid) -> PortResult<()>;

    // --- Scholarships and Curriculum ---
    /// All scholarships, newest first.
    async fn list_scholarships(&self) -> PortResult<Vec<Scholarship>>;

    async fn get_program(&self, major: &str) -> PortResult<Program>;
}
