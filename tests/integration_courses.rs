mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, get, insert_course, insert_faculty, insert_student, send_json, test_app, token_for,
};
use scholaris::modules::courses::service::CourseService;
use scholaris_models::UserRole;
use scholaris_models::courses::UpdateCourseDto;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

fn admin_token() -> String {
    token_for(Uuid::new_v4(), UserRole::Admin)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_single_seat_course_fills_up(pool: PgPool) {
    let course_id = insert_course(&pool, None, 1).await;
    let (_, first) = insert_student(&pool, "Grade 9").await;
    let (_, second) = insert_student(&pool, "Grade 9").await;
    let token = admin_token();
    let uri = format!("/api/courses/{course_id}/enroll");

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", &uri, Some(&token), &json!({ "student_id": first })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", &uri, Some(&token), &json!({ "student_id": second })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Course is full");

    let roster = CourseService::get_roster(&pool, course_id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].student_id, first);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_enrollment_leaves_course_unchanged(pool: PgPool) {
    let course_id = insert_course(&pool, None, 30).await;
    let (_, student_id) = insert_student(&pool, "Grade 10").await;

    CourseService::enroll_student(&pool, course_id, student_id)
        .await
        .unwrap();
    let before = CourseService::get_course(&pool, course_id).await.unwrap();

    let err = CourseService::enroll_student(&pool, course_id, student_id)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message(), "Student is already enrolled in this course");

    let after = CourseService::get_course(&pool, course_id).await.unwrap();
    assert_eq!(before.enrolled_count, after.enrolled_count);
    assert_eq!(after.enrolled_count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enroll_unknown_student_is_not_found(pool: PgPool) {
    let course_id = insert_course(&pool, None, 5).await;

    let response = test_app(pool)
        .oneshot(send_json(
            "POST",
            &format!("/api/courses/{course_id}/enroll"),
            Some(&admin_token()),
            &json!({ "student_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unenroll_requires_membership(pool: PgPool) {
    let course_id = insert_course(&pool, None, 5).await;
    let (_, student_id) = insert_student(&pool, "Grade 9").await;

    let err = CourseService::unenroll_student(&pool, course_id, student_id)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);

    CourseService::enroll_student(&pool, course_id, student_id)
        .await
        .unwrap();
    CourseService::unenroll_student(&pool, course_id, student_id)
        .await
        .unwrap();
    assert!(CourseService::get_roster(&pool, course_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_roster_limited_to_the_teaching_faculty(pool: PgPool) {
    let (teacher_user, teacher) = insert_faculty(&pool).await;
    let (other_user, _) = insert_faculty(&pool).await;
    let course_id = insert_course(&pool, Some(teacher), 5).await;
    let uri = format!("/api/courses/{course_id}/students");

    let response = test_app(pool.clone())
        .oneshot(get(&uri, Some(&token_for(teacher_user, UserRole::Faculty))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_app(pool.clone())
        .oneshot(get(&uri, Some(&token_for(other_user, UserRole::Faculty))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (student_user, _) = insert_student(&pool, "Grade 9").await;
    let response = test_app(pool)
        .oneshot(get(&uri, Some(&token_for(student_user, UserRole::Student))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_capacity_cannot_drop_below_enrollment(pool: PgPool) {
    let course_id = insert_course(&pool, None, 3).await;
    for _ in 0..2 {
        let (_, student_id) = insert_student(&pool, "Grade 9").await;
        CourseService::enroll_student(&pool, course_id, student_id)
            .await
            .unwrap();
    }

    let response = test_app(pool)
        .oneshot(send_json(
            "PUT",
            &format!("/api/courses/{course_id}"),
            Some(&admin_token()),
            &json!({ "max_students": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_capacity_update_waits_for_pending_enrollment(pool: PgPool) {
    let course_id = insert_course(&pool, None, 2).await;
    let (_, first) = insert_student(&pool, "Grade 9").await;
    let (_, second) = insert_student(&pool, "Grade 9").await;
    CourseService::enroll_student(&pool, course_id, first)
        .await
        .unwrap();

    // A second enrollment is in flight and holds the course row.
    let mut pending = pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
        .bind(course_id)
        .execute(&mut *pending)
        .await
        .unwrap();
    sqlx::query("INSERT INTO course_enrollments (course_id, student_id) VALUES ($1, $2)")
        .bind(course_id)
        .bind(second)
        .execute(&mut *pending)
        .await
        .unwrap();

    let update = tokio::spawn({
        let pool = pool.clone();
        async move {
            let dto = UpdateCourseDto {
                max_students: Some(1),
                ..Default::default()
            };
            CourseService::update_course(&pool, course_id, dto).await
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!update.is_finished());

    pending.commit().await.unwrap();
    let err = update.await.unwrap().unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);

    let course = CourseService::get_course(&pool, course_id).await.unwrap();
    assert_eq!(course.max_students, 2);
    assert_eq!(course.enrolled_count, 2);
}
