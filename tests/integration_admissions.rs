mod common;

use axum::http::StatusCode;
use common::{body_json, get, insert_user, send_json, test_app, token_for, unique_email};
use scholaris::modules::admissions::service::AdmissionService;
use scholaris_models::admissions::AdmissionStatus;
use scholaris_models::{AdmissionId, UserId, UserRole};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

fn application() -> Value {
    json!({
        "student_info": {
            "first_name": "Asha",
            "last_name": "Verma",
            "date_of_birth": "2012-04-18"
        },
        "academic_info": {
            "applying_for_grade": "Grade 7",
            "academic_year": "2025-2026"
        },
        "contact_info": {
            "email": "asha.family@example.com",
            "phone": "+91 98765 43210",
            "address": "12 Lake Road"
        },
        "parent_info": {
            "guardian_name": "Ravi Verma",
            "relation": "father",
            "phone": "+91 98765 43211"
        }
    })
}

async fn submit(pool: &PgPool) -> (AdmissionId, String) {
    let response = test_app(pool.clone())
        .oneshot(send_json("POST", "/api/general/admissions", None, &application()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let id: AdmissionId = serde_json::from_value(body["data"]["id"].clone()).unwrap();
    let number = body["data"]["application_number"].as_str().unwrap().to_string();
    (id, number)
}

async fn reviewer(pool: &PgPool) -> UserId {
    UserId::from_uuid(insert_user(pool, &unique_email(), UserRole::Admin).await)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_public_submission_and_lookup(pool: PgPool) {
    let (_, number) = submit(&pool).await;
    assert!(number.starts_with("ADM-"));
    assert_eq!(number.len(), "ADM-2025-000000".len());

    let response = test_app(pool)
        .oneshot(get(
            &format!("/api/general/admissions/{}", number.to_lowercase()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "submitted");
    assert_eq!(body["data"]["application_number"], number.as_str());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_decisions_are_final(pool: PgPool) {
    let reviewer = reviewer(&pool).await;

    let (approved, _) = submit(&pool).await;
    AdmissionService::approve(&pool, approved, reviewer, None)
        .await
        .unwrap();

    let err = AdmissionService::approve(&pool, approved, reviewer, None)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
    let err = AdmissionService::reject(&pool, approved, reviewer, "Seats full".into(), None)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
    let stored = AdmissionService::get_admission(&pool, approved).await.unwrap();
    assert_eq!(stored.status, AdmissionStatus::Approved);

    let (rejected, _) = submit(&pool).await;
    AdmissionService::reject(&pool, rejected, reviewer, "Incomplete documents".into(), None)
        .await
        .unwrap();
    let err = AdmissionService::approve(&pool, rejected, reviewer, None)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
    let stored = AdmissionService::get_admission(&pool, rejected).await.unwrap();
    assert_eq!(stored.status, AdmissionStatus::Rejected);
    assert_eq!(stored.rejection_reason.as_deref(), Some("Incomplete documents"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_endpoints_are_admin_only(pool: PgPool) {
    let (id, _) = submit(&pool).await;
    let uri = format!("/api/admin/admissions/{id}/approve");

    let faculty = token_for(uuid::Uuid::new_v4(), UserRole::Faculty);
    let response = test_app(pool.clone())
        .oneshot(send_json("POST", &uri, Some(&faculty), &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_user = insert_user(&pool, &unique_email(), UserRole::Admin).await;
    let response = test_app(pool)
        .oneshot(send_json(
            "POST",
            &uri,
            Some(&token_for(admin_user, UserRole::Admin)),
            &json!({ "remarks": "Interview passed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "approved");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_endpoint_refuses_decisions(pool: PgPool) {
    let reviewer = reviewer(&pool).await;
    let (id, _) = submit(&pool).await;

    let review = AdmissionService::update_status(
        &pool,
        id,
        reviewer,
        AdmissionStatus::UnderReview,
        None,
    )
    .await
    .unwrap();
    assert_eq!(review.status, AdmissionStatus::UnderReview);

    let err = AdmissionService::update_status(&pool, id, reviewer, AdmissionStatus::Approved, None)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}
