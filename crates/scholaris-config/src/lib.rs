//! # Scholaris Config
//!
//! Configuration structures loaded from environment variables. Every loader
//! falls back to a development default when a variable is unset or does not
//! parse, except `DATABASE_URL`, which is required.
//!
//! - [`jwt`]: token signing secret and lifetimes
//! - [`cors`]: allowed browser origins
//! - [`rate_limit`]: login/refresh throttling
//! - [`payment`]: the mock payment gateway
//! - [`database`]: connection pool settings
//! - [`server`]: bind address
//!
//! ```ignore
//! use scholaris_config::{JwtConfig, CorsConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod payment;
pub mod rate_limit;
pub mod server;

mod env;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use payment::PaymentConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
