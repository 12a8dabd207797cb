//! Role-based authorization middleware.
//!
//! Each `require_*` function is meant for `middleware::from_fn_with_state` on a
//! router prefix. It verifies the token once, checks the role, and leaves the
//! [`AuthUser`] in the request extensions for the handlers below it.

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use scholaris_core::AppError;
use scholaris_models::UserRole;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];
pub const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Faculty];
pub const STUDENT_OR_PARENT: &[UserRole] = &[UserRole::Student, UserRole::Parent];
pub const PAYERS: &[UserRole] = &[UserRole::Student, UserRole::Parent, UserRole::Admin];

/// Checks that the authenticated user holds one of `allowed_roles`.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    let role = auth_user.role()?;

    if !allowed_roles.contains(&role) {
        let allowed: Vec<&str> = allowed_roles.iter().map(UserRole::as_str).collect();
        return Err(AppError::forbidden(anyhow!(
            "Access denied. Required roles: {}, but user has role: {}",
            allowed.join(", "),
            role
        )));
    }

    Ok(())
}

pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;
    check_any_role(&auth_user, allowed_roles)?;

    parts.extensions.insert(auth_user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn gate(state: AppState, req: Request, next: Next, allowed_roles: &[UserRole]) -> Response {
    match require_roles(&state, req, next, allowed_roles).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, ADMIN_ONLY).await
}

/// Faculty routes; administrators are let through as well.
pub async fn require_faculty(State(state): State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, STAFF).await
}

pub async fn require_student_or_parent(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    gate(state, req, next, STUDENT_OR_PARENT).await
}

/// Anyone who may pay a fee: the student, a parent, or the front office.
pub async fn require_payer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    gate(state, req, next, PAYERS).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use scholaris_auth::Claims;

    fn user(role: &str) -> AuthUser {
        AuthUser(Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "someone@school.edu".to_string(),
            role: role.to_string(),
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_admin_only() {
        assert!(check_any_role(&user("admin"), ADMIN_ONLY).is_ok());
        let err = check_any_role(&user("faculty"), ADMIN_ONLY).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_staff_includes_admin_and_faculty() {
        assert!(check_any_role(&user("admin"), STAFF).is_ok());
        assert!(check_any_role(&user("faculty"), STAFF).is_ok());
        assert!(check_any_role(&user("student"), STAFF).is_err());
    }

    #[test]
    fn test_student_portal_roles() {
        assert!(check_any_role(&user("student"), STUDENT_OR_PARENT).is_ok());
        assert!(check_any_role(&user("parent"), STUDENT_OR_PARENT).is_ok());
        assert!(check_any_role(&user("admin"), STUDENT_OR_PARENT).is_err());
    }

    #[test]
    fn test_payers() {
        for role in ["student", "parent", "admin"] {
            assert!(check_any_role(&user(role), PAYERS).is_ok());
        }
        assert!(check_any_role(&user("faculty"), PAYERS).is_err());
    }

    #[test]
    fn test_unknown_role_is_unauthorized() {
        let err = check_any_role(&user("janitor"), STAFF).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_denial_message_names_roles() {
        let err = check_any_role(&user("parent"), STAFF).unwrap_err();
        assert_eq!(
            err.message(),
            "Access denied. Required roles: admin, faculty, but user has role: parent"
        );
    }
}
