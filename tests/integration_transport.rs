mod common;

use axum::http::StatusCode;
use common::{body_json, insert_student, send_json, test_app, token_for};
use scholaris::modules::transport::service::TransportService;
use scholaris_models::UserRole;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_route_assignment_respects_capacity(pool: PgPool) {
    let admin = token_for(Uuid::new_v4(), UserRole::Admin);

    let response = test_app(pool.clone())
        .oneshot(send_json(
            "POST",
            "/api/transport",
            Some(&admin),
            &json!({
                "route_name": "North Loop",
                "vehicle_number": "ka-01-ab-1234",
                "capacity": 1,
                "fare": 1500,
                "stops": [{ "name": "Main Gate", "pickup_time": "07:30" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let route = body_json(response).await;
    assert_eq!(route["data"]["vehicle_number"], "KA-01-AB-1234");
    let route_id = route["data"]["id"].as_str().unwrap().to_string();
    let assign = format!("/api/transport/{route_id}/assign");

    let (_, first) = insert_student(&pool, "Grade 6").await;
    let (_, second) = insert_student(&pool, "Grade 6").await;

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", &assign, Some(&admin), &json!({ "student_id": first })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["assigned_count"], 1);

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", &assign, Some(&admin), &json!({ "student_id": first })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test_app(pool.clone())
        .oneshot(send_json("POST", &assign, Some(&admin), &json!({ "student_id": second })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Transport route is full");

    let route_id = route_id.parse().unwrap();
    TransportService::unassign_student(&pool, route_id, first)
        .await
        .unwrap();
    let err = TransportService::unassign_student(&pool, route_id, first)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}
