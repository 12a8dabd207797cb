//! Middleware and extractors for authentication and authorization.
//!
//! - [`auth`]: the [`AuthUser`](auth::AuthUser) bearer-token extractor and the
//!   [`AdminUser`](auth::AdminUser) guard
//! - [`role`]: router-level role gates
//!
//! ```ignore
//! Router::new()
//!     .nest("/admin", admin_routes)
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
//! ```

pub mod auth;
pub mod role;
