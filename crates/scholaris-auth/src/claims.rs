use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// One of `admin`, `faculty`, `student`, `parent`
    pub role: String,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Claims embedded in refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    /// Unique token identifier so two refresh tokens never collide
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_round_trip_json() {
        let json = r#"{"sub":"user-1","email":"a@b.edu","role":"faculty","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.role, "faculty");
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_refresh_claims_are_not_access_claims() {
        let json = r#"{"sub":"user-1","email":"a@b.edu","exp":9999999999,"iat":9999999900,"jti":"x"}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }
}
