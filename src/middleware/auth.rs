use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use scholaris_auth::{Claims, verify_token};
use scholaris_core::AppError;
use scholaris_models::{UserId, UserRole};

use crate::state::AppState;

/// Extractor that validates the bearer JWT and provides the caller's claims.
///
/// When a role middleware already verified the token it stores the result in
/// the request extensions, and the extractor reuses it.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse()
            .map(UserId::from_uuid)
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid user ID in token")))
    }

    pub fn role(&self) -> Result<UserRole, AppError> {
        self.0
            .role
            .parse()
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid role in token")))
    }

    pub fn is(&self, role: UserRole) -> bool {
        self.role().is_ok_and(|r| r == role)
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::unauthorized(anyhow!("Missing authorization header"))
                    } else {
                        AppError::unauthorized(anyhow!("Invalid authorization header format"))
                    }
                })?;

        let claims = verify_token(bearer.token(), &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Extractor for handlers that only administrators may call, on routers that
/// are otherwise open to every signed-in user.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.is(UserRole::Admin) {
            return Err(AppError::forbidden(anyhow!(
                "Access denied. Administrator privileges required."
            )));
        }

        Ok(AdminUser(auth_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: &str) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "registrar@school.edu".to_string(),
            role: role.to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id() {
        let id = Uuid::new_v4();
        let user = AuthUser(Claims {
            sub: id.to_string(),
            ..claims("admin")
        });
        assert_eq!(user.user_id().unwrap(), UserId::from_uuid(id));
    }

    #[test]
    fn test_bad_subject_is_unauthorized() {
        let user = AuthUser(Claims {
            sub: "not-a-uuid".to_string(),
            ..claims("admin")
        });
        assert_eq!(
            user.user_id().unwrap_err().status,
            axum::http::StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(AuthUser(claims("parent")).role().unwrap(), UserRole::Parent);
        assert!(AuthUser(claims("faculty")).is(UserRole::Faculty));
        assert!(!AuthUser(claims("faculty")).is(UserRole::Admin));
        assert!(AuthUser(claims("teacher")).role().is_err());
    }
}
