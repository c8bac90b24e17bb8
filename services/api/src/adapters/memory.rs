//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. The server runs
//! on it in development when no `DATABASE_URL` is set, and the integration
//! tests seed it directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::domain::{
    AcademicRecord, Class, Enrollment, Grades, Instructor, Notification, NotificationPatch,
    Principal, Program, Role, Scholarship, Student,
};
use portal_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
struct Account {
    email: String,
    full_name: Option<String>,
    password_hash: Option<String>,
}

#[derive(Default)]
struct Collections {
    accounts: HashMap<(Role, Uuid), Account>,
    students: Vec<Student>,
    instructors: Vec<Instructor>,
    classes: Vec<Class>,
    enrollments: Vec<Enrollment>,
    academic_records: Vec<AcademicRecord>,
    notifications: Vec<Notification>,
    scholarships: Vec<Scholarship>,
    programs: HashMap<String, Program>,
}

/// Store backed by plain collections behind one lock.
#[derive(Default)]
pub struct MemoryDb {
    inner: RwLock<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a student. The account exists but cannot log in until a password is set.
    pub async fn insert_student(&self, student: Student) {
        let mut db = self.inner.write().await;
        db.accounts.insert(
            (Role::Student, student.id),
            Account {
                email: student.email.clone(),
                full_name: Some(student.full_name.clone()),
                password_hash: None,
            },
        );
        db.students.push(student);
    }

    pub async fn insert_instructor(&self, instructor: Instructor) {
        let mut db = self.inner.write().await;
        db.accounts.insert(
            (Role::Instructor, instructor.id),
            Account {
                email: instructor.email.clone(),
                full_name: Some(instructor.full_name.clone()),
                password_hash: None,
            },
        );
        db.instructors.push(instructor);
    }

    pub async fn insert_class(&self, class: Class) {
        self.inner.write().await.classes.push(class);
    }

    pub async fn insert_enrollment(&self, enrollment: Enrollment) {
        self.inner.write().await.enrollments.push(enrollment);
    }

    pub async fn insert_academic_record(&self, record: AcademicRecord) {
        self.inner.write().await.academic_records.push(record);
    }

    pub async fn insert_scholarship(&self, scholarship: Scholarship) {
        self.inner.write().await.scholarships.push(scholarship);
    }

    pub async fn insert_program(&self, program: Program) {
        self.inner
            .write()
            .await
            .programs
            .insert(program.major.clone(), program);
    }

    /// Removes a principal entirely, leaving any sessions it holds dangling.
    pub async fn remove_principal(&self, role: Role, id: Uuid) {
        let mut db = self.inner.write().await;
        db.accounts.remove(&(role, id));
        match role {
            Role::Student => db.students.retain(|s| s.id != id),
            Role::Instructor => db.instructors.retain(|i| i.id != id),
            Role::Admin => {}
        }
    }
}

fn principal(role: Role, id: Uuid, account: &Account) -> Option<Principal> {
    account.password_hash.as_ref().map(|hash| Principal {
        id,
        email: account.email.clone(),
        full_name: account.full_name.clone(),
        password_hash: hash.clone(),
        role,
    })
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn find_principal_by_email(&self, role: Role, email: &str) -> PortResult<Principal> {
        let db = self.inner.read().await;
        db.accounts
            .iter()
            .filter(|((r, _), account)| *r == role && account.email == email)
            .find_map(|((_, id), account)| principal(role, *id, account))
            .ok_or_else(|| PortError::NotFound(format!("No {} with that email", role)))
    }

    async fn find_principal_by_id(&self, role: Role, id: Uuid) -> PortResult<Principal> {
        let db = self.inner.read().await;
        db.accounts
            .get(&(role, id))
            .and_then(|account| principal(role, id, account))
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, id)))
    }

    async fn create_admin(
        &self,
        email: &str,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> PortResult<Principal> {
        let id = Uuid::new_v4();
        let account = Account {
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
            password_hash: Some(password_hash.to_string()),
        };
        let created = principal(Role::Admin, id, &account)
            .ok_or_else(|| PortError::Unexpected("admin created without password".to_string()))?;
        self.inner
            .write()
            .await
            .accounts
            .insert((Role::Admin, id), account);
        Ok(created)
    }

    async fn set_password_hash(&self, role: Role, id: Uuid, password_hash: &str) -> PortResult<()> {
        let mut db = self.inner.write().await;
        let account = db
            .accounts
            .get_mut(&(role, id))
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", role, id)))?;
        account.password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn set_password_hash_by_email(
        &self,
        role: Role,
        email: &str,
        password_hash: &str,
    ) -> PortResult<Uuid> {
        let mut db = self.inner.write().await;
        let (key, account) = db
            .accounts
            .iter_mut()
            .find(|((r, _), account)| *r == role && account.email == email)
            .ok_or_else(|| PortError::NotFound(format!("No {} with email {}", role, email)))?;
        account.password_hash = Some(password_hash.to_string());
        Ok(key.1)
    }

    async fn list_students(&self) -> PortResult<Vec<Student>> {
        let mut students = self.inner.read().await.students.clone();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(students)
    }

    async fn get_student(&self, student_id: Uuid) -> PortResult<Student> {
        self.inner
            .read()
            .await
            .students
            .iter()
            .find(|s| s.id == student_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Student {} not found", student_id)))
    }

    async fn find_students_by_ids(&self, ids: &[Uuid]) -> PortResult<Vec<Student>> {
        Ok(self
            .inner
            .read()
            .await
            .students
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn list_academic_records(&self, student_id: Uuid) -> PortResult<Vec<AcademicRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .academic_records
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_instructors(&self) -> PortResult<Vec<Instructor>> {
        let mut instructors = self.inner.read().await.instructors.clone();
        instructors.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(instructors)
    }

    async fn get_instructor(&self, instructor_id: Uuid) -> PortResult<Instructor> {
        self.inner
            .read()
            .await
            .instructors
            .iter()
            .find(|i| i.id == instructor_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Instructor {} not found", instructor_id)))
    }

    async fn list_classes(&self) -> PortResult<Vec<Class>> {
        let mut classes = self.inner.read().await.classes.clone();
        classes.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(classes)
    }

    async fn get_class(&self, class_id: Uuid) -> PortResult<Class> {
        self.inner
            .read()
            .await
            .classes
            .iter()
            .find(|c| c.id == class_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Class {} not found", class_id)))
    }

    async fn list_classes_by_instructor(&self, instructor_id: Uuid) -> PortResult<Vec<Class>> {
        let mut classes: Vec<Class> = self
            .inner
            .read()
            .await
            .classes
            .iter()
            .filter(|c| c.instructor_id == Some(instructor_id))
            .cloned()
            .collect();
        classes.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(classes)
    }

    async fn list_enrollments_for_class(&self, class_id: Uuid) -> PortResult<Vec<Enrollment>> {
        Ok(self
            .inner
            .read()
            .await
            .enrollments
            .iter()
            .filter(|e| e.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn update_enrollment_grades(
        &self,
        class_id: Uuid,
        student_id: Uuid,
        grades: &Grades,
    ) -> PortResult<()> {
        let mut db = self.inner.write().await;
        let enrollment = db
            .enrollments
            .iter_mut()
            .find(|e| e.class_id == class_id && e.student_id == student_id)
            .ok_or_else(|| {
                PortError::NotFound(format!(
                    "Student {} is not enrolled in class {}",
                    student_id, class_id
                ))
            })?;
        enrollment.grades = grades.clone();
        Ok(())
    }

    async fn insert_notification(&self, notification: Notification) -> PortResult<()> {
        self.inner.write().await.notifications.push(notification);
        Ok(())
    }

    async fn list_notifications(&self) -> PortResult<Vec<Notification>> {
        let mut notifications = self.inner.read().await.notifications.clone();
        newest_first(&mut notifications, |n| n.created_at);
        Ok(notifications)
    }

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification> {
        self.inner
            .read()
            .await
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Notification {} not found", notification_id)))
    }

    async fn update_notification(
        &self,
        notification_id: Uuid,
        patch: NotificationPatch,
        updated_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut db = self.inner.write().await;
        let notification = db
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| PortError::NotFound(format!("Notification {} not found", notification_id)))?;
        patch.apply(notification, updated_at);
        Ok(())
    }

    async fn delete_notification(&self, notification_id: Uuid) -> PortResult<()> {
        let mut db = self.inner.write().await;
        let before = db.notifications.len();
        db.notifications.retain(|n| n.id != notification_id);
        if db.notifications.len() == before {
            return Err(PortError::NotFound(format!(
                "Notification {} not found",
                notification_id
            )));
        }
        Ok(())
    }

    async fn list_scholarships(&self) -> PortResult<Vec<Scholarship>> {
        let mut scholarships = self.inner.read().await.scholarships.clone();
        newest_first(&mut scholarships, |s| s.created_at);
        Ok(scholarships)
    }

    async fn get_program(&self, major: &str) -> PortResult<Program> {
        self.inner
            .read()
            .await
            .programs
            .get(major)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("No program for major {}", major)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn principals_without_password_cannot_be_found() {
        let db = MemoryDb::new();
        let id = Uuid::new_v4();
        db.insert_student(Student {
            id,
            student_code: "S001".to_string(),
            full_name: "Lan Pham".to_string(),
            email: "lan@uni.test".to_string(),
            class_name: None,
            faculty: None,
            major: None,
            profile: serde_json::Value::Null,
            created_at: Utc::now(),
        })
        .await;

        assert!(matches!(
            db.find_principal_by_email(Role::Student, "lan@uni.test").await,
            Err(PortError::NotFound(_))
        ));

        let updated = db
            .set_password_hash_by_email(Role::Student, "lan@uni.test", "hash")
            .await
            .unwrap();
        assert_eq!(updated, id);
        let found = db.find_principal_by_id(Role::Student, id).await.unwrap();
        assert_eq!(found.password_hash, "hash");
        assert!(db.find_principal_by_id(Role::Instructor, id).await.is_err());
    }

    #[tokio::test]
    async fn delete_reports_missing_notifications() {
        let db = MemoryDb::new();
        assert!(matches!(
            db.delete_notification(Uuid::new_v4()).await,
            Err(PortError::NotFound(_))
        ));
    }
}
