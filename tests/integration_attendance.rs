mod common;

use axum::http::StatusCode;
use common::{
    body_json, get, insert_course, insert_faculty, insert_student, send_json, test_app, token_for,
};
use scholaris::modules::attendance::service::AttendanceService;
use scholaris_models::UserRole;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

fn roll(records: Vec<Value>) -> Value {
    json!({
        "academic_year": "2024-2025",
        "session": "1",
        "records": records
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_resubmitted_roll_stores_one_record(pool: PgPool) {
    let (teacher_user, teacher) = insert_faculty(&pool).await;
    let course_id = insert_course(&pool, Some(teacher), 30).await;
    let (_, student_id) = insert_student(&pool, "Grade 9").await;
    let token = token_for(teacher_user, UserRole::Faculty);
    let body = roll(vec![json!({
        "student_id": student_id,
        "course_id": course_id,
        "date": "2024-09-02",
        "status": "present"
    })]);

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", "/api/faculty/attendance", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["data"]["created"], 1);
    assert_eq!(first["data"]["duplicates"], 0);

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", "/api/faculty/attendance", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await;
    assert_eq!(second["data"]["created"], 0);
    assert_eq!(second["data"]["duplicates"], 1);
    assert_eq!(second["data"]["skipped"][0]["reason"], "duplicate");

    let stored: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM attendance WHERE student_id = $1 AND course_id = $2",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stored, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_filters_are_ignored(pool: PgPool) {
    let (teacher_user, teacher) = insert_faculty(&pool).await;
    let course_id = insert_course(&pool, Some(teacher), 30).await;
    let (_, student_id) = insert_student(&pool, "Grade 9").await;
    let token = token_for(teacher_user, UserRole::Faculty);
    let body = roll(vec![json!({
        "student_id": student_id,
        "course_id": course_id,
        "date": "2024-09-02",
        "status": "late"
    })]);

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", "/api/faculty/attendance", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test_app(pool.clone())
        .oneshot(get(
            "/api/faculty/attendance?status=&session=&date=&student_id=&page=2&limit=5",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["data"]["meta"]["total"], 1);
    assert_eq!(listed["data"]["meta"]["page"], 2);
    assert_eq!(listed["data"]["items"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_students_are_counted_as_failed(pool: PgPool) {
    let (teacher_user, teacher) = insert_faculty(&pool).await;
    let course_id = insert_course(&pool, Some(teacher), 30).await;
    let (_, student_id) = insert_student(&pool, "Grade 9").await;
    let body = roll(vec![
        json!({ "student_id": student_id, "course_id": course_id, "date": "2024-09-03", "status": "late" }),
        json!({ "student_id": uuid::Uuid::new_v4(), "course_id": course_id, "date": "2024-09-03", "status": "absent" }),
    ]);

    let response = test_app(pool)
        .oneshot(send_json(
            "POST",
            "/api/faculty/attendance",
            Some(&token_for(teacher_user, UserRole::Faculty)),
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["created"], 1);
    assert_eq!(body["data"]["failed"], 1);
    assert_eq!(body["message"], "1 recorded, 0 duplicates skipped, 1 failed");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_faculty_cannot_mark_other_courses(pool: PgPool) {
    let (_, owner) = insert_faculty(&pool).await;
    let (intruder_user, _) = insert_faculty(&pool).await;
    let course_id = insert_course(&pool, Some(owner), 30).await;
    let (_, student_id) = insert_student(&pool, "Grade 9").await;
    let body = roll(vec![json!({
        "student_id": student_id,
        "course_id": course_id,
        "date": "2024-09-02",
        "status": "present"
    })]);

    let response = test_app(pool.clone())
        .oneshot(send_json(
            "POST",
            "/api/faculty/attendance",
            Some(&token_for(intruder_user, UserRole::Faculty)),
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_percentage_counts_present_and_late(pool: PgPool) {
    let (teacher_user, teacher) = insert_faculty(&pool).await;
    let course_id = insert_course(&pool, Some(teacher), 30).await;
    let (student_user, student_id) = insert_student(&pool, "Grade 9").await;

    let empty = AttendanceService::calculate_attendance_percentage(
        &pool, student_id, course_id, None, None,
    )
    .await
    .unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.percentage, 0.0);

    let records: Vec<Value> = [
        ("2024-09-02", "present"),
        ("2024-09-03", "late"),
        ("2024-09-04", "absent"),
        ("2024-09-05", "excused"),
    ]
    .into_iter()
    .map(|(date, status)| {
        json!({ "student_id": student_id, "course_id": course_id, "date": date, "status": status })
    })
    .collect();

    let response = test_app(pool.clone())
        .oneshot(send_json(
            "POST",
            "/api/faculty/attendance",
            Some(&token_for(teacher_user, UserRole::Faculty)),
            &roll(records),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let stats = AttendanceService::calculate_attendance_percentage(
        &pool,
        student_id,
        course_id,
        Some("2024-2025"),
        None,
    )
    .await
    .unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.present_or_late, 2);
    assert_eq!(stats.percentage, 50.0);

    let response = test_app(pool)
        .oneshot(get(
            &format!("/api/student/attendance/percentage?course_id={course_id}"),
            Some(&token_for(student_user, UserRole::Student)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["percentage"], 50.0);
}
