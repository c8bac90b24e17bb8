//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Nested documents (profiles, course lists, grades, program subjects) live in
//! JSONB columns. Foreign-key columns carry no constraints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::domain::{
    AcademicRecord, Class, CourseResult, Enrollment, Grades, Instructor, Notification,
    NotificationPatch, Principal, Program, ProgramSubject, Role, Scholarship, Student, TargetType,
};
use portal_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        other => unexpected(other),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct PrincipalRecord {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    password_hash: String,
}
impl PrincipalRecord {
    fn to_domain(self, role: Role) -> Principal {
        Principal {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            password_hash: self.password_hash,
            role,
        }
    }
}

#[derive(FromRow)]
struct StudentRecord {
    id: Uuid,
    student_code: String,
    full_name: String,
    email: String,
    class_name: Option<String>,
    faculty: Option<String>,
    major: Option<String>,
    profile: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}
impl StudentRecord {
    fn to_domain(self) -> Student {
        Student {
            id: self.id,
            student_code: self.student_code,
            full_name: self.full_name,
            email: self.email,
            class_name: self.class_name,
            faculty: self.faculty,
            major: self.major,
            profile: self.profile.0,
            created_at: self.created_at,
        }
    }
}

const STUDENT_COLUMNS: &str =
    "id, student_code, full_name, email, class_name, faculty, major, profile, created_at";

#[derive(FromRow)]
struct InstructorRecord {
    id: Uuid,
    full_name: String,
    email: String,
    department: Option<String>,
    title: Option<String>,
    profile: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}
impl InstructorRecord {
    fn to_domain(self) -> Instructor {
        Instructor {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            department: self.department,
            title: self.title,
            profile: self.profile.0,
            created_at: self.created_at,
        }
    }
}

const INSTRUCTOR_COLUMNS: &str = "id, full_name, email, department, title, profile, created_at";

#[derive(FromRow)]
struct ClassRecord {
    id: Uuid,
    code: String,
    name: String,
    semester: Option<String>,
    instructor_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}
impl ClassRecord {
    fn to_domain(self) -> Class {
        Class {
            id: self.id,
            code: self.code,
            name: self.name,
            semester: self.semester,
            instructor_id: self.instructor_id,
            created_at: self.created_at,
        }
    }
}

const CLASS_COLUMNS: &str = "id, code, name, semester, instructor_id, created_at";

#[derive(FromRow)]
struct EnrollmentRecord {
    class_id: Uuid,
    student_id: Uuid,
    grades: Json<Grades>,
    status: String,
}
impl EnrollmentRecord {
    fn to_domain(self) -> Enrollment {
        Enrollment {
            class_id: self.class_id,
            student_id: self.student_id,
            grades: self.grades.0,
            status: self.status,
        }
    }
}

#[derive(FromRow)]
struct AcademicRecordRow {
    id: Uuid,
    student_id: Uuid,
    semester: String,
    status: String,
    courses: Json<Vec<CourseResult>>,
}
impl AcademicRecordRow {
    fn to_domain(self) -> AcademicRecord {
        AcademicRecord {
            id: self.id,
            student_id: self.student_id,
            semester: self.semester,
            status: self.status,
            courses: self.courses.0,
        }
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: Uuid,
    title: String,
    content: String,
    target_type: String,
    target_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    created_by: Uuid,
    is_active: bool,
    updated_at: Option<DateTime<Utc>>,
}
impl NotificationRecord {
    fn to_domain(self) -> PortResult<Notification> {
        let target_type = self.target_type.parse::<TargetType>().map_err(|e| {
            PortError::Unexpected(format!("Notification {}: {}", self.id, e))
        })?;
        Ok(Notification {
            id: self.id,
            title: self.title,
            content: self.content,
            target_type,
            target_ids: self.target_ids,
            created_at: self.created_at,
            created_by: self.created_by,
            is_active: self.is_active,
            updated_at: self.updated_at,
        })
    }
}

const NOTIFICATION_COLUMNS: &str =
    "id, title, content, target_type, target_ids, created_at, created_by, is_active, updated_at";

#[derive(FromRow)]
struct ScholarshipRecord {
    id: Uuid,
    title: String,
    content: String,
    link: Option<String>,
    created_at: DateTime<Utc>,
}
impl ScholarshipRecord {
    fn to_domain(self) -> Scholarship {
        Scholarship {
            id: self.id,
            title: self.title,
            content: self.content,
            link: self.link,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProgramRecord {
    major: String,
    subjects: Json<Vec<ProgramSubject>>,
}
impl ProgramRecord {
    fn to_domain(self) -> Program {
        Program {
            major: self.major,
            subjects: self.subjects.0,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn find_principal_by_email(&self, role: Role, email: &str) -> PortResult<Principal> {
        let sql = format!(
            "SELECT id, email, full_name, password_hash FROM {} \
             WHERE email = $1 AND password_hash IS NOT NULL",
            role.collection()
        );
        let record = sqlx::query_as::<_, PrincipalRecord>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, || format!("No {} with that email", role)))?;
        Ok(record.to_domain(role))
    }

    async fn find_principal_by_id(&self, role: Role, id: Uuid) -> PortResult<Principal> {
        let sql = format!(
            "SELECT id, email, full_name, password_hash FROM {} \
             WHERE id = $1 AND password_hash IS NOT NULL",
            role.collection()
        );
        let record = sqlx::query_as::<_, PrincipalRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, || format!("{} {} not found", role, id)))?;
        Ok(record.to_domain(role))
    }

    async fn create_admin(
        &self,
        email: &str,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> PortResult<Principal> {
        let record = sqlx::query_as::<_, PrincipalRecord>(
            "INSERT INTO admins (id, email, full_name, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, full_name, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(full_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain(Role::Admin))
    }

    async fn set_password_hash(&self, role: Role, id: Uuid, password_hash: &str) -> PortResult<()> {
        let sql = format!(
            "UPDATE {} SET password_hash = $1 WHERE id = $2",
            role.collection()
        );
        let result = sqlx::query(&sql)
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("{} {} not found", role, id)));
        }
        Ok(())
    }

    async fn set_password_hash_by_email(
        &self,
        role: Role,
        email: &str,
        password_hash: &str,
    ) -> PortResult<Uuid> {
        let sql = format!(
            "UPDATE {} SET password_hash = $1 WHERE email = $2 RETURNING id",
            role.collection()
        );
        sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(password_hash)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, || format!("No {} with email {}", role, email)))
    }

    async fn list_students(&self) -> PortResult<Vec<Student>> {
        let sql = format!("SELECT {} FROM students ORDER BY full_name", STUDENT_COLUMNS);
        let records = sqlx::query_as::<_, StudentRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_student(&self, student_id: Uuid) -> PortResult<Student> {
        let sql = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        let record = sqlx::query_as::<_, StudentRecord>(&sql)
            .bind(student_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, || format!("Student {} not found", student_id)))?;
        Ok(record.to_domain())
    }

    async fn find_students_by_ids(&self, ids: &[Uuid]) -> PortResult<Vec<Student>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM students WHERE id = ANY($1)", STUDENT_COLUMNS);
        let records = sqlx::query_as::<_, StudentRecord>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_academic_records(&self, student_id: Uuid) -> PortResult<Vec<AcademicRecord>> {
        let records = sqlx::query_as::<_, AcademicRecordRow>(
            "SELECT id, student_id, semester, status, courses FROM academic_records \
             WHERE student_id = $1 ORDER BY created_at ASC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_instructors(&self) -> PortResult<Vec<Instructor>> {
        let sql = format!("SELECT {} FROM instructors ORDER BY full_name", INSTRUCTOR_COLUMNS);
        let records = sqlx::query_as::<_, InstructorRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_instructor(&self, instructor_id: Uuid) -> PortResult<Instructor> {
        let sql = format!("SELECT {} FROM instructors WHERE id = $1", INSTRUCTOR_COLUMNS);
        let record = sqlx::query_as::<_, InstructorRecord>(&sql)
            .bind(instructor_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                not_found_or_unexpected(e, || format!("Instructor {} not found", instructor_id))
            })?;
        Ok(record.to_domain())
    }

    async fn list_classes(&self) -> PortResult<Vec<Class>> {
        let sql = format!("SELECT {} FROM classes ORDER BY code", CLASS_COLUMNS);
        let records = sqlx::query_as::<_, ClassRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_class(&self, class_id: Uuid) -> PortResult<Class> {
        let sql = format!("SELECT {} FROM classes WHERE id = $1", CLASS_COLUMNS);
        let record = sqlx::query_as::<_, ClassRecord>(&sql)
            .bind(class_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| not_found_or_unexpected(e, || format!("Class {} not found", class_id)))?;
        Ok(record.to_domain())
    }

    async fn list_classes_by_instructor(&self, instructor_id: Uuid) -> PortResult<Vec<Class>> {
        let sql = format!(
            "SELECT {} FROM classes WHERE instructor_id = $1 ORDER BY code",
            CLASS_COLUMNS
        );
        let records = sqlx::query_as::<_, ClassRecord>(&sql)
            .bind(instructor_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_enrollments_for_class(&self, class_id: Uuid) -> PortResult<Vec<Enrollment>> {
        let records = sqlx::query_as::<_, EnrollmentRecord>(
            "SELECT class_id, student_id, grades, status FROM enrollments WHERE class_id = $1",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_enrollment_grades(
        &self,
        class_id: Uuid,
        student_id: Uuid,
        grades: &Grades,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE enrollments SET grades = $3 WHERE class_id = $1 AND student_id = $2",
        )
        .bind(class_id)
        .bind(student_id)
        .bind(Json(grades))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Student {} is not enrolled in class {}",
                student_id, class_id
            )));
        }
        Ok(())
    }

    async fn insert_notification(&self, notification: Notification) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO notifications \
             (id, title, content, target_type, target_ids, created_at, created_by, is_active, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(notification.id)
        .bind(&notification.title)
        .bind(&notification.content)
        .bind(notification.target_type.as_str())
        .bind(&notification.target_ids)
        .bind(notification.created_at)
        .bind(notification.created_by)
        .bind(notification.is_active)
        .bind(notification.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_notifications(&self) -> PortResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {} FROM notifications ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        );
        let records = sqlx::query_as::<_, NotificationRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification> {
        let sql = format!("SELECT {} FROM notifications WHERE id = $1", NOTIFICATION_COLUMNS);
        let record = sqlx::query_as::<_, NotificationRecord>(&sql)
            .bind(notification_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                not_found_or_unexpected(e, || format!("Notification {} not found", notification_id))
            })?;
        record.to_domain()
    }

    async fn update_notification(
        &self,
        notification_id: Uuid,
        patch: NotificationPatch,
        updated_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET \
             title = COALESCE($2, title), \
             content = COALESCE($3, content), \
             target_type = COALESCE($4, target_type), \
             target_ids = COALESCE($5, target_ids), \
             is_active = COALESCE($6, is_active), \
             updated_at = $7 \
             WHERE id = $1",
        )
        .bind(notification_id)
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.target_type.map(|t| t.as_str()))
        .bind(patch.target_ids)
        .bind(patch.is_active)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Notification {} not found",
                notification_id
            )));
        }
        Ok(())
    }

    async fn delete_notification(&self, notification_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Notification {} not found",
                notification_id
            )));
        }
        Ok(())
    }

    async fn list_scholarships(&self) -> PortResult<Vec<Scholarship>> {
        let records = sqlx::query_as::<_, ScholarshipRecord>(
            "SELECT id, title, content, link, created_at FROM scholarships ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_program(&self, major: &str) -> PortResult<Program> {
        let record = sqlx::query_as::<_, ProgramRecord>(
            "SELECT major, subjects FROM programs WHERE major = $1",
        )
        .bind(major)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("No program for major {}", major)))?;
        Ok(record.to_domain())
    }
}
