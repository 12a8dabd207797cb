mod common;

use axum::http::StatusCode;
use common::{body_json, get, insert_student, send_json, test_app, token_for};
use scholaris_models::{FeeStructureId, UserRole};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn insert_fee(pool: &PgPool, grade_level: &str, amount: i64) -> FeeStructureId {
    sqlx::query_scalar::<_, FeeStructureId>(
        r#"INSERT INTO fee_structures (name, fee_type, grade_level, academic_year, amount)
           VALUES ('Term 1 tuition', 'tuition', $1, '2024-2025', $2)
           RETURNING id"#,
    )
    .bind(grade_level)
    .bind(amount)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_intent_captures_exactly_once(pool: PgPool) {
    let (student_user, student_id) = insert_student(&pool, "Grade 8").await;
    let fee_id = insert_fee(&pool, "Grade 8", 50_000).await;
    let token = token_for(student_user, UserRole::Student);

    let response = test_app(pool.clone())
        .oneshot(send_json(
            "POST",
            "/api/payments/create",
            Some(&token),
            &json!({ "student_id": student_id, "fee_structure_id": fee_id, "amount": 20_000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let intent = body_json(response).await;
    let reference = intent["data"]["reference"].as_str().unwrap().to_string();
    let secret = intent["data"]["client_secret"].as_str().unwrap().to_string();
    assert!(reference.starts_with("pi_"));
    assert_eq!(intent["data"]["status"], "created");

    let capture = json!({ "reference": reference, "client_secret": secret });
    let response = test_app(pool.clone())
        .oneshot(send_json("POST", "/api/payments/capture", Some(&token), &capture))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let captured = body_json(response).await;
    assert_eq!(captured["data"]["intent"]["status"], "captured");
    assert_eq!(captured["data"]["payment"]["amount"], 20_000);
    assert_eq!(captured["data"]["payment"]["method"], "online");

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", "/api/payments/capture", Some(&token), &capture))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = test_app(pool)
        .oneshot(get("/api/student/fees", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["data"]["total_due"], 50_000);
    assert_eq!(summary["data"]["total_paid"], 20_000);
    assert_eq!(summary["data"]["balance"], 30_000);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_wrong_client_secret_is_rejected(pool: PgPool) {
    let (student_user, student_id) = insert_student(&pool, "Grade 8").await;
    let fee_id = insert_fee(&pool, "Grade 8", 10_000).await;
    let token = token_for(student_user, UserRole::Student);

    let response = test_app(pool.clone())
        .oneshot(send_json(
            "POST",
            "/api/payments/create",
            Some(&token),
            &json!({ "student_id": student_id, "fee_structure_id": fee_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let intent = body_json(response).await;
    assert_eq!(intent["data"]["amount"], 10_000);

    let response = test_app(pool)
        .oneshot(send_json(
            "POST",
            "/api/payments/capture",
            Some(&token),
            &json!({
                "reference": intent["data"]["reference"],
                "client_secret": "0".repeat(64)
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_pay_for_someone_else(pool: PgPool) {
    let (student_user, _) = insert_student(&pool, "Grade 8").await;
    let (_, other_student) = insert_student(&pool, "Grade 8").await;
    let fee_id = insert_fee(&pool, "Grade 8", 10_000).await;

    let response = test_app(pool)
        .oneshot(send_json(
            "POST",
            "/api/payments/create",
            Some(&token_for(student_user, UserRole::Student)),
            &json!({ "student_id": other_student, "fee_structure_id": fee_id }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
