//! Requests that are settled by routing, auth or validation before any query
//! runs. The pool is lazy and points nowhere.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, lazy_pool, send_json, test_app, token_for};
use scholaris_models::UserRole;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn token(role: UserRole) -> String {
    token_for(Uuid::new_v4(), role)
}

#[tokio::test]
async fn test_health_is_public() {
    let response = test_app(lazy_pool())
        .oneshot(get("/api/general/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let response = test_app(lazy_pool())
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["info"]["title"], "Scholaris API");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    for uri in [
        "/api/admin/users",
        "/api/faculty/courses",
        "/api/student/profile",
        "/api/courses",
        "/api/calendar",
        "/api/auth/me",
    ] {
        let response = test_app(lazy_pool()).oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body.get("errors").is_none());
    }
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let response = test_app(lazy_pool())
        .oneshot(get("/api/admin/dashboard/stats", Some("not.a.jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_prefix_rejects_other_roles() {
    for role in [UserRole::Faculty, UserRole::Student, UserRole::Parent] {
        let response = test_app(lazy_pool())
            .oneshot(get("/api/admin/students", Some(&token(role))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role}");
    }
}

#[tokio::test]
async fn test_faculty_prefix_rejects_students_and_parents() {
    for role in [UserRole::Student, UserRole::Parent] {
        let response = test_app(lazy_pool())
            .oneshot(get("/api/faculty/attendance", Some(&token(role))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role}");
    }
}

#[tokio::test]
async fn test_student_prefix_rejects_staff() {
    for role in [UserRole::Admin, UserRole::Faculty] {
        let response = test_app(lazy_pool())
            .oneshot(get("/api/student/grades", Some(&token(role))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role}");
    }
}

#[tokio::test]
async fn test_payments_reject_faculty() {
    let body = json!({ "reference": "pi_0", "client_secret": "x" });
    let response = test_app(lazy_pool())
        .oneshot(send_json(
            "POST",
            "/api/payments/capture",
            Some(&token(UserRole::Faculty)),
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_shared_resource_writes_need_admin() {
    let body = json!({ "code": "MATH", "name": "Mathematics" });
    for (method, uri) in [
        ("POST", "/api/subjects"),
        ("POST", "/api/courses"),
        ("POST", "/api/transport"),
        ("POST", "/api/calendar"),
    ] {
        let response = test_app(lazy_pool())
            .oneshot(send_json(
                method,
                uri,
                Some(&token(UserRole::Faculty)),
                &body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn test_missing_field_reported_per_field() {
    let response = test_app(lazy_pool())
        .oneshot(send_json(
            "POST",
            "/api/courses",
            Some(&token(UserRole::Admin)),
            &json!({ "name": "Algebra I" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "code");
}

#[tokio::test]
async fn test_login_validates_before_lookup() {
    let response = test_app(lazy_pool())
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "not-an-email", "password": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/general/admissions")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"student_info\":"))
        .unwrap();

    let response = test_app(lazy_pool()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attendance_roll_validation() {
    let body = json!({
        "academic_year": "2024-2025",
        "session": "1",
        "records": []
    });
    let response = test_app(lazy_pool())
        .oneshot(send_json(
            "POST",
            "/api/faculty/attendance",
            Some(&token(UserRole::Faculty)),
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_query_value_uses_error_envelope() {
    let response = test_app(lazy_pool())
        .oneshot(get(
            "/api/faculty/attendance?status=asleep",
            Some(&token(UserRole::Faculty)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query parameter")
    );
}

#[tokio::test]
async fn test_bad_path_id_uses_error_envelope() {
    let response = test_app(lazy_pool())
        .oneshot(get("/api/courses/not-a-uuid", Some(&token(UserRole::Student))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid path parameter")
    );
}
