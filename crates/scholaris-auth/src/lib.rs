//! # Scholaris Auth
//!
//! JWT claim structures and token functions.
//!
//! - **Access token** ([`Claims`]): short-lived, carries the user's role so
//!   role checks need no database lookup
//! - **Refresh token** ([`RefreshTokenClaims`]): long-lived, only exchangeable
//!   for a new token pair
//!
//! The two shapes are not interchangeable: an access token has no `jti` and a
//! refresh token has no `role`, so each fails to decode as the other.
//!
//! ```ignore
//! use scholaris_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "teacher@school.edu", "faculty", &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
