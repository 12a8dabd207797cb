//! Scholaris Observability
//!
//! Structured logging, per-request log lines, and Prometheus metrics.
//!
//! Everything heavier than console logging sits behind the `observability`
//! feature (on by default). With the feature compiled in, the
//! `OBSERVABILITY_ENABLED` environment variable can still switch it off at
//! runtime. With the feature off, the same functions exist as no-ops so callers
//! never need their own `cfg` guards.
//!
//! ```no_run
//! use scholaris_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     let _prometheus = init_metrics();
//! }
//! ```

mod console;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use console::init_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, is_observability_enabled, logging_middleware};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, metrics_app, metrics_middleware, track_admission_decision,
    track_admission_submitted, track_attendance_recorded, track_enrollment, track_login_failure,
    track_login_success, track_payment_captured,
};

#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Falls back to plain console output.
    pub fn init_tracing() {
        super::init_console_logging();
    }

    pub fn init_metrics() -> Option<()> {
        None
    }

    pub fn track_login_success(_role: &str) {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_attendance_recorded(_created: usize, _duplicates: usize, _failed: usize) {}
    pub fn track_admission_submitted() {}
    pub fn track_admission_decision(_status: &str) {}
    pub fn track_enrollment(_outcome: &str) {}
    pub fn track_payment_captured(_amount: i64) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
