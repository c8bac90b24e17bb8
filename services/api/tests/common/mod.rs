//! Shared fixture for the router-level tests: a seeded in-memory store, the
//! full application router and request helpers.
#![allow(dead_code)]

use api_lib::{
    adapters::MemoryDb,
    config::{Config, Environment},
    web::{app_router, password::hash_password, AppState},
};
use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use portal_core::{
    AcademicRecord, Class, Completion, CourseResult, DatabaseService, Enrollment, Instructor,
    Notification, Program, ProgramSubject, Role, Scholarship, Student, TargetType,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::Level;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct-horse";

pub const ADMIN_EMAIL: &str = "admin@uni.test";
pub const INSTRUCTOR_EMAIL: &str = "an.nguyen@uni.test";
pub const OTHER_INSTRUCTOR_EMAIL: &str = "binh.tran@uni.test";
pub const STUDENT_EMAIL: &str = "lan.pham@uni.test";
pub const OTHER_STUDENT_EMAIL: &str = "minh.le@uni.test";

pub const MAJOR: &str = "Computer Science";

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        log_level: Level::DEBUG,
        jwt_secret: SECRET.to_string(),
        environment: Environment::Development,
        cors_origin: HeaderValue::from_static("http://localhost:5173"),
    }
}

pub struct TestApp {
    pub db: Arc<MemoryDb>,
    pub router: Router,
    pub admin_id: Uuid,
    /// Teaches `class_id` and `empty_class_id`.
    pub instructor_id: Uuid,
    /// Teaches `other_class_id`.
    pub other_instructor_id: Uuid,
    /// Has a major, academic records and is enrolled in both populated classes.
    pub student_id: Uuid,
    /// No major; enrolled in `class_id` only.
    pub other_student_id: Uuid,
    pub class_id: Uuid,
    pub other_class_id: Uuid,
    pub empty_class_id: Uuid,
}

fn student(id: Uuid, code: &str, name: &str, email: &str, major: Option<&str>) -> Student {
    Student {
        id,
        student_code: code.to_string(),
        full_name: name.to_string(),
        email: email.to_string(),
        class_name: Some("K65-CS1".to_string()),
        faculty: Some("Information Technology".to_string()),
        major: major.map(str::to_string),
        profile: serde_json::json!({ "gender": "F" }),
        created_at: Utc::now(),
    }
}

fn instructor(id: Uuid, name: &str, email: &str) -> Instructor {
    Instructor {
        id,
        full_name: name.to_string(),
        email: email.to_string(),
        department: Some("Software Engineering".to_string()),
        title: Some("Lecturer".to_string()),
        profile: serde_json::json!({}),
        created_at: Utc::now(),
    }
}

fn class(id: Uuid, code: &str, instructor_id: Uuid) -> Class {
    Class {
        id,
        code: code.to_string(),
        name: format!("Class {code}"),
        semester: Some("2024-1".to_string()),
        instructor_id: Some(instructor_id),
        created_at: Utc::now(),
    }
}

pub fn course(code: &str, credits: u32, score: Option<f64>, exempt: bool) -> CourseResult {
    CourseResult {
        course_code: code.to_string(),
        course_name: format!("Course {code}"),
        credits,
        total_score: score,
        exempt,
        complete: Completion::from_score(score, exempt),
    }
}

fn subject(code: &str, credits: u32, category: &str) -> ProgramSubject {
    ProgramSubject {
        course_code: code.to_string(),
        course_name: format!("Course {code}"),
        credits,
        category: category.to_string(),
    }
}

pub fn notification(
    created_by: Uuid,
    title: &str,
    target_type: TargetType,
    target_ids: Vec<Uuid>,
    age_minutes: i64,
) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: format!("{title} details"),
        target_type,
        target_ids,
        created_at: Utc::now() - Duration::minutes(age_minutes),
        created_by,
        is_active: true,
        updated_at: None,
    }
}

/// Builds the router over a freshly seeded store. Every principal's password is [`PASSWORD`].
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let db = Arc::new(MemoryDb::new());
    let hash = hash_password(PASSWORD).unwrap();

    let admin = db
        .create_admin(ADMIN_EMAIL, Some("Portal Admin"), &hash)
        .await
        .unwrap();

    let instructor_id = Uuid::new_v4();
    let other_instructor_id = Uuid::new_v4();
    db.insert_instructor(instructor(instructor_id, "An Nguyen", INSTRUCTOR_EMAIL))
        .await;
    db.insert_instructor(instructor(other_instructor_id, "Binh Tran", OTHER_INSTRUCTOR_EMAIL))
        .await;

    let student_id = Uuid::new_v4();
    let other_student_id = Uuid::new_v4();
    db.insert_student(student(student_id, "20240001", "Lan Pham", STUDENT_EMAIL, Some(MAJOR)))
        .await;
    db.insert_student(student(other_student_id, "20240002", "Minh Le", OTHER_STUDENT_EMAIL, None))
        .await;

    for (role, email) in [
        (Role::Instructor, INSTRUCTOR_EMAIL),
        (Role::Instructor, OTHER_INSTRUCTOR_EMAIL),
        (Role::Student, STUDENT_EMAIL),
        (Role::Student, OTHER_STUDENT_EMAIL),
    ] {
        db.set_password_hash_by_email(role, email, &hash).await.unwrap();
    }

    let class_id = Uuid::new_v4();
    let other_class_id = Uuid::new_v4();
    let empty_class_id = Uuid::new_v4();
    db.insert_class(class(class_id, "INT3306", instructor_id)).await;
    db.insert_class(class(other_class_id, "INT2204", other_instructor_id)).await;
    db.insert_class(class(empty_class_id, "INT3507", instructor_id)).await;

    db.insert_enrollment(Enrollment::new(class_id, student_id)).await;
    db.insert_enrollment(Enrollment::new(class_id, other_student_id)).await;
    db.insert_enrollment(Enrollment::new(other_class_id, student_id)).await;

    db.insert_academic_record(AcademicRecord {
        id: Uuid::new_v4(),
        student_id,
        semester: "2023-1".to_string(),
        status: "completed".to_string(),
        courses: vec![
            course("INT1008", 3, Some(8.0), false),
            course("MAT1093", 4, Some(6.0), false),
            course("PES1015", 2, None, true),
        ],
    })
    .await;
    db.insert_academic_record(AcademicRecord {
        id: Uuid::new_v4(),
        student_id,
        semester: "2023-2".to_string(),
        status: "in_progress".to_string(),
        courses: vec![
            course("INT2210", 3, Some(3.0), false),
            course("INT2211", 4, None, false),
        ],
    })
    .await;

    db.insert_program(Program {
        major: MAJOR.to_string(),
        subjects: vec![
            subject("MAT1093", 4, "foundation"),
            subject("INT1008", 3, "core"),
            subject("INT2210", 3, "core"),
            subject("INT3306", 3, "elective"),
        ],
    })
    .await;

    db.insert_scholarship(Scholarship {
        id: Uuid::new_v4(),
        title: "Merit scholarship".to_string(),
        content: "For the top 5% of each cohort".to_string(),
        link: None,
        created_at: Utc::now() - Duration::days(10),
    })
    .await;
    db.insert_scholarship(Scholarship {
        id: Uuid::new_v4(),
        title: "Exchange grant".to_string(),
        content: "One semester abroad".to_string(),
        link: Some("https://uni.test/exchange".to_string()),
        created_at: Utc::now() - Duration::days(1),
    })
    .await;

    let store: Arc<dyn DatabaseService> = db.clone();
    let state = Arc::new(AppState::new(store, Arc::new(config)));

    TestApp {
        db,
        router: app_router(state),
        admin_id: admin.id,
        instructor_id,
        other_instructor_id,
        student_id,
        other_student_id,
        class_id,
        other_class_id,
        empty_class_id,
    }
}

/// Builds a request with an optional JSON body and an optional `Cookie` header.
pub fn request(method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
    pub raw: String,
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
        TestResponse {
            status,
            set_cookie,
            body,
            raw,
        }
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send(request("GET", uri, None, Some(cookie))).await
    }

    /// Logs in and returns the `name=token` pair to send back as a cookie.
    pub async fn login(&self, role: Role, email: &str) -> String {
        let res = self
            .send(request(
                "POST",
                &format!("/api/{}/login", role),
                Some(serde_json::json!({ "email": email, "password": PASSWORD })),
                None,
            ))
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.raw);
        cookie_pair(&res.set_cookie.expect("login sets a cookie"))
    }
}

/// `adminToken=abc; HttpOnly; ...` -> `adminToken=abc`
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}
