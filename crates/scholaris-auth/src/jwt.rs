//! Token creation and verification.

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use scholaris_config::JwtConfig;
use scholaris_core::AppError;

use crate::claims::{Claims, RefreshTokenClaims};

/// Returns `(iat, exp)` for a token living `lifetime` seconds.
fn timestamps(lifetime: i64) -> (usize, usize) {
    let now = Utc::now().timestamp();
    (now as usize, (now + lifetime).max(0) as usize)
}

/// Creates a signed access token for a user and role.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (iat, exp) = timestamps(jwt_config.access_token_expiry);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp,
        iat,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry of an access token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired token")))
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (iat, exp) = timestamps(jwt_config.refresh_token_expiry);
    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create refresh token: {}", e)))
}

pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired refresh token")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = create_access_token(user_id, "teacher@school.edu", "faculty", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "teacher@school.edu");
        assert_eq!(claims.role, "faculty");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_token_garbage() {
        assert!(verify_token("not-a-token", &test_config()).is_err());
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let token =
            create_access_token(Uuid::new_v4(), "a@b.edu", "admin", &test_config()).unwrap();
        let other = JwtConfig {
            secret: "a-completely-different-secret-of-decent-length".to_string(),
            ..test_config()
        };

        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig {
            access_token_expiry: -600,
            ..test_config()
        };
        let token = create_access_token(Uuid::new_v4(), "a@b.edu", "admin", &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = create_refresh_token(user_id, "a@b.edu", &config).unwrap();
        let claims = verify_refresh_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let config = test_config();
        let refresh = create_refresh_token(Uuid::new_v4(), "a@b.edu", &config).unwrap();
        let access = create_access_token(Uuid::new_v4(), "a@b.edu", "student", &config).unwrap();

        assert!(verify_token(&refresh, &config).is_err());
        assert!(verify_refresh_token(&access, &config).is_err());
    }

    #[test]
    fn test_refresh_outlives_access() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let access = create_access_token(user_id, "a@b.edu", "parent", &config).unwrap();
        let refresh = create_refresh_token(user_id, "a@b.edu", &config).unwrap();

        let access = verify_token(&access, &config).unwrap();
        let refresh = verify_refresh_token(&refresh, &config).unwrap();
        assert!(refresh.exp > access.exp);
    }
}
