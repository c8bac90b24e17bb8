//! Student surface: profile, academic summary, curriculum, notifications and scholarships.

mod common;

use axum::http::StatusCode;
use common::{notification, spawn_app, MAJOR, OTHER_STUDENT_EMAIL, STUDENT_EMAIL};
use portal_core::{DatabaseService, Role, TargetType};
use serde_json::json;

#[tokio::test]
async fn profile_is_the_callers_own_record() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Student, STUDENT_EMAIL).await;

    let res = app.get("/api/student/profile", &cookie).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["student"]["_id"], app.student_id.to_string());
    assert_eq!(res.body["student"]["major"], MAJOR);
    assert!(!res.raw.contains("password"));
}

#[tokio::test]
async fn academic_records_come_with_a_summary() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Student, STUDENT_EMAIL).await;

    let res = app.get("/api/student/academic-records", &cookie).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["academicRecords"].as_array().unwrap().len(), 2);

    let summary = &res.body["summary"];
    // 3 + 4 passed, 2 exempt; the failed and in-progress courses add nothing.
    assert_eq!(summary["total_credits_taken"], 9);
    // (8.0 * 3 + 6.0 * 4) / 7
    assert_eq!(summary["accumulated_average"], 6.86);
    assert_eq!(summary["total_credits_required"], 150);
    assert_eq!(
        summary["semesters"],
        json!([
            { "semester": "2023-1", "credits_taken": 9, "semester_average": 6.86 },
            { "semester": "2023-2", "credits_taken": 7, "semester_average": 0.0 },
        ])
    );
}

#[tokio::test]
async fn student_without_records_gets_a_zero_summary() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Student, OTHER_STUDENT_EMAIL).await;

    let res = app.get("/api/student/academic-records", &cookie).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["academicRecords"], json!([]));
    assert_eq!(res.body["summary"]["total_credits_taken"], 0);
    assert_eq!(res.body["summary"]["accumulated_average"], 0.0);
}

#[tokio::test]
async fn curriculum_is_grouped_by_category() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Student, STUDENT_EMAIL).await;

    let res = app.get("/api/student/curriculum", &cookie).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["major"], MAJOR);
    let curriculum = res.body["curriculum"].as_object().unwrap();
    let categories: Vec<&String> = curriculum.keys().collect();
    assert_eq!(categories, ["core", "elective", "foundation"]);
    let core: Vec<&str> = curriculum["core"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["course_code"].as_str().unwrap())
        .collect();
    assert_eq!(core, ["INT1008", "INT2210"]);
}

#[tokio::test]
async fn curriculum_needs_a_major() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Student, OTHER_STUDENT_EMAIL).await;

    let res = app.get("/api/student/curriculum", &cookie).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "No major on record for this student");
}

#[tokio::test]
async fn scholarships_are_newest_first() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Student, STUDENT_EMAIL).await;

    let res = app.get("/api/student/scholarships", &cookie).await;

    assert_eq!(res.status, StatusCode::OK);
    let titles: Vec<&str> = res.body["scholarships"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Exchange grant", "Merit scholarship"]);
}

#[tokio::test]
async fn feed_respects_targets() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Student, STUDENT_EMAIL).await;

    for n in [
        notification(app.admin_id, "Everyone", TargetType::All, vec![], 30),
        notification(app.admin_id, "Staff meeting", TargetType::Instructors, vec![], 10),
        notification(app.admin_id, "Enrollment opens", TargetType::Students, vec![], 5),
        notification(app.admin_id, "Tuition reminder", TargetType::Specific, vec![app.student_id], 2),
        notification(
            app.admin_id,
            "Someone else",
            TargetType::Specific,
            vec![app.other_student_id],
            1,
        ),
    ] {
        app.db.insert_notification(n).await.unwrap();
    }

    let mine = app.get("/api/student/notifications", &cookie).await;
    let titles: Vec<&str> = mine.body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Tuition reminder", "Enrollment opens", "Everyone"]);

    let other_cookie = app.login(Role::Student, OTHER_STUDENT_EMAIL).await;
    let theirs = app.get("/api/student/notifications", &other_cookie).await;
    assert_eq!(theirs.body["notifications"][0]["title"], "Someone else");
    assert_eq!(theirs.body["notifications"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn instructor_cookie_does_not_open_student_routes() {
    let app = spawn_app().await;
    let cookie = app.login(Role::Instructor, common::INSTRUCTOR_EMAIL).await;

    let res = app.get("/api/student/profile", &cookie).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Access denied: no session token");
}
