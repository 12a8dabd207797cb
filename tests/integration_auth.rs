mod common;

use axum::http::StatusCode;
use common::{
    TEST_PASSWORD, body_json, get, insert_student, insert_user, send_json, test_app, token_for,
    unique_email,
};
use scholaris_models::UserRole;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_returns_tokens_and_me_works(pool: PgPool) {
    let email = unique_email();
    insert_user(&pool, &email, UserRole::Faculty).await;

    let response = test_app(pool.clone())
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": email.to_uppercase(), "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["user"]["role"], "faculty");
    assert!(body["data"]["user"].get("password_hash").is_none());
    let access = body["data"]["access_token"].as_str().unwrap().to_string();

    let response = test_app(pool)
        .oneshot(get("/api/auth/me", Some(&access)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["data"]["email"], email.as_str());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_wrong_password_and_unknown_email_look_alike(pool: PgPool) {
    let email = unique_email();
    insert_user(&pool, &email, UserRole::Student).await;

    let mut messages = Vec::new();
    for (email, password) in [(email.as_str(), "wrong-password"), ("nobody@school.edu", TEST_PASSWORD)] {
        let response = test_app(pool.clone())
            .oneshot(send_json(
                "POST",
                "/api/auth/login",
                None,
                &json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        messages.push(body_json(response).await["message"].clone());
    }
    assert_eq!(messages[0], messages[1]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_account_cannot_log_in(pool: PgPool) {
    let email = unique_email();
    let user_id = insert_user(&pool, &email, UserRole::Student).await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    let response = test_app(pool)
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": email, "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_parent_sees_only_linked_children(pool: PgPool) {
    let parent = insert_user(&pool, &unique_email(), UserRole::Parent).await;
    let (_, child) = insert_student(&pool, "Grade 5").await;
    let (_, stranger) = insert_student(&pool, "Grade 5").await;
    sqlx::query("UPDATE students SET parent_user_id = $2 WHERE id = $1")
        .bind(child)
        .bind(parent)
        .execute(&pool)
        .await
        .unwrap();
    let token = token_for(parent, UserRole::Parent);

    let response = test_app(pool.clone())
        .oneshot(get(&format!("/api/student/profile?student_id={child}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_app(pool.clone())
        .oneshot(get(&format!("/api/student/profile?student_id={stranger}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_app(pool.clone())
        .oneshot(get("/api/student/profile", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test_app(pool)
        .oneshot(get("/api/student/children", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
