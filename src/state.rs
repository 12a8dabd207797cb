use scholaris_config::{CorsConfig, JwtConfig, PaymentConfig, RateLimitConfig};
use scholaris_db::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub payment_config: PaymentConfig,
}

/// Builds the shared state around an already connected pool.
pub fn init_app_state(db: PgPool) -> AppState {
    AppState {
        db,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
        payment_config: PaymentConfig::from_env(),
    }
}
