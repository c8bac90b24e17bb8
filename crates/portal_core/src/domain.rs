//! crates/portal_core/src/domain.rs
//!
//! Defines the core data structures of the portal: principals, the academic
//! entities they read, and the notifications admins publish.
//! Foreign keys are plain ids; nothing here checks that they resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Principals
//=========================================================================================

/// The three kinds of account that can hold a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Student => "student",
        }
    }

    /// The collection holding principals of this role.
    pub fn collection(&self) -> &'static str {
        match self {
            Role::Admin => "admins",
            Role::Instructor => "instructors",
            Role::Student => "students",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Only used internally for login and the session guard - contains the password hash.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// The public view of a principal, safe to send to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

impl Principal {
    pub fn profile(&self) -> PrincipalProfile {
        PrincipalProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

//=========================================================================================
// Academic entities
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub student_code: String,
    pub full_name: String,
    pub email: String,
    pub class_name: Option<String>,
    pub faculty: Option<String>,
    pub major: Option<String>,
    /// Free-form profile fields (birth date, gender, training system, ...).
    #[serde(default)]
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub semester: Option<String>,
    pub instructor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Grade sheet kept on an enrollment. Every component is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grades {
    pub midterm: Option<f64>,
    #[serde(rename = "final")]
    pub final_exam: Option<f64>,
    pub total: Option<f64>,
    pub assignments: Option<f64>,
    pub attendance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub class_id: Uuid,
    pub student_id: Uuid,
    #[serde(default)]
    pub grades: Grades,
    #[serde(default = "Enrollment::default_status")]
    pub status: String,
}

impl Enrollment {
    pub fn new(class_id: Uuid, student_id: Uuid) -> Self {
        Self {
            class_id,
            student_id,
            grades: Grades::default(),
            status: Self::default_status(),
        }
    }

    fn default_status() -> String {
        "active".to_string()
    }
}

/// Outcome of a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    Passed,
    Failed,
    Exempt,
    InProgress,
}

impl Completion {
    /// Minimum total score that passes a course.
    pub const PASSING_SCORE: f64 = 4.0;

    pub fn from_score(score: Option<f64>, exempt: bool) -> Self {
        if exempt {
            return Completion::Exempt;
        }
        match score {
            Some(s) if s >= Self::PASSING_SCORE => Completion::Passed,
            Some(_) => Completion::Failed,
            None => Completion::InProgress,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResult {
    pub course_code: String,
    pub course_name: String,
    pub credits: u32,
    pub total_score: Option<f64>,
    #[serde(default)]
    pub exempt: bool,
    pub complete: Completion,
}

/// One semester of a student's results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub student_id: Uuid,
    pub semester: String,
    pub status: String,
    pub courses: Vec<CourseResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSubject {
    pub course_code: String,
    pub course_name: String,
    pub credits: u32,
    pub category: String,
}

/// The curriculum of a major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub major: String,
    pub subjects: Vec<ProgramSubject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scholarship {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Notifications
//=========================================================================================

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    All,
    Students,
    Instructors,
    Specific,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::All => "all",
            TargetType::Students => "students",
            TargetType::Instructors => "instructors",
            TargetType::Specific => "specific",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target type `{0}`")]
pub struct UnknownTargetType(pub String);

impl FromStr for TargetType {
    type Err = UnknownTargetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TargetType::All),
            "students" => Ok(TargetType::Students),
            "instructors" => Ok(TargetType::Instructors),
            "specific" => Ok(TargetType::Specific),
            other => Err(UnknownTargetType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub target_type: TargetType,
    pub target_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Whether the feed of `principal_id` (holding `role`) should show this notification.
    pub fn is_visible_to(&self, role: Role, principal_id: Uuid) -> bool {
        if !self.is_active {
            return false;
        }
        match self.target_type {
            TargetType::All => true,
            TargetType::Students => role == Role::Student,
            TargetType::Instructors => role == Role::Instructor,
            TargetType::Specific => self.target_ids.contains(&principal_id),
        }
    }
}

/// A partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct NotificationPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub target_type: Option<TargetType>,
    pub target_ids: Option<Vec<Uuid>>,
    pub is_active: Option<bool>,
}

impl NotificationPatch {
    pub fn apply(self, notification: &mut Notification, updated_at: DateTime<Utc>) {
        if let Some(title) = self.title {
            notification.title = title;
        }
        if let Some(content) = self.content {
            notification.content = content;
        }
        if let Some(target_type) = self.target_type {
            notification.target_type = target_type;
        }
        if let Some(target_ids) = self.target_ids {
            notification.target_ids = target_ids;
        }
        if let Some(is_active) = self.is_active {
            notification.is_active = is_active;
        }
        notification.updated_at = Some(updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(target_type: TargetType, target_ids: Vec<Uuid>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            title: "Exam schedule".to_string(),
            content: "Finals start on the 12th".to_string(),
            target_type,
            target_ids,
            created_at: Utc::now(),
            created_by: Uuid::new_v4(),
            is_active: true,
            updated_at: None,
        }
    }

    #[test]
    fn completion_follows_score() {
        assert_eq!(Completion::from_score(Some(8.5), false), Completion::Passed);
        assert_eq!(Completion::from_score(Some(4.0), false), Completion::Passed);
        assert_eq!(Completion::from_score(Some(3.9), false), Completion::Failed);
        assert_eq!(Completion::from_score(None, false), Completion::InProgress);
        assert_eq!(Completion::from_score(None, true), Completion::Exempt);
    }

    #[test]
    fn target_type_parses_known_values_only() {
        assert_eq!("specific".parse::<TargetType>(), Ok(TargetType::Specific));
        assert!("everyone".parse::<TargetType>().is_err());
    }

    #[test]
    fn visibility_respects_targets() {
        let me = Uuid::new_v4();

        assert!(notification(TargetType::All, vec![]).is_visible_to(Role::Student, me));
        assert!(notification(TargetType::Students, vec![]).is_visible_to(Role::Student, me));
        assert!(!notification(TargetType::Students, vec![]).is_visible_to(Role::Instructor, me));
        assert!(notification(TargetType::Instructors, vec![]).is_visible_to(Role::Instructor, me));
        assert!(notification(TargetType::Specific, vec![me]).is_visible_to(Role::Student, me));
        assert!(!notification(TargetType::Specific, vec![Uuid::new_v4()]).is_visible_to(Role::Student, me));
    }

    #[test]
    fn inactive_notifications_are_hidden() {
        let mut n = notification(TargetType::All, vec![]);
        n.is_active = false;
        assert!(!n.is_visible_to(Role::Student, Uuid::new_v4()));
    }

    #[test]
    fn patch_keeps_absent_fields_and_honors_false() {
        let mut n = notification(TargetType::All, vec![]);
        let before = n.clone();
        let stamp = Utc::now();

        NotificationPatch {
            is_active: Some(false),
            ..Default::default()
        }
        .apply(&mut n, stamp);

        assert!(!n.is_active);
        assert_eq!(n.updated_at, Some(stamp));
        assert_eq!(n.title, before.title);
        assert_eq!(n.content, before.content);
        assert_eq!(n.target_type, before.target_type);
        assert_eq!(n.created_at, before.created_at);
    }
}
