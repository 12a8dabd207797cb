use axum::{
    Router,
    routing::{get, post},
};
use scholaris_config::RateLimitConfig;
use tower_governor::GovernorLayer;

use crate::modules::auth::controller::{change_password, get_me, login_user, refresh_token};
use crate::state::AppState;

/// Login and refresh are throttled per client IP when rate limiting is on.
pub fn init_auth_router(rate_limit_config: &RateLimitConfig) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login_user))
        .route("/refresh", post(refresh_token));

    let public = match rate_limit_config.auth_governor_config() {
        Some(config) => public.layer(GovernorLayer::new(config)),
        None => public,
    };

    Router::new()
        .merge(public)
        .route("/me", get(get_me))
        .route("/change-password", post(change_password))
}
