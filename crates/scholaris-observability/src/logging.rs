use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::{default_filter, init_console_logging};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "storage/logs";

/// Reads `OBSERVABILITY_ENABLED` once; anything but `false`/`0` keeps it on.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "off"))
            .unwrap_or(true)
    })
}

fn log_request(
    request_id: &str,
    method: &str,
    path: &str,
    status: StatusCode,
    latency: Duration,
) {
    let status = status.as_u16();
    let latency_ms = latency.as_millis() as u64;

    match status {
        400..=499 => warn!(request_id, method, path, status, latency_ms, "Client error"),
        500..=599 => error!(request_id, method, path, status, latency_ms, "Server error"),
        _ => info!(request_id, method, path, status, latency_ms, "Request completed"),
    }
}

/// One line per request, keyed by a fresh request id. The route template
/// (`/api/courses/{id}`) is logged rather than the raw path when available.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = uuid::Uuid::new_v4().to_string();

    info!(request_id = %request_id, method = %method, path = %path, "Incoming request");

    let response = next.run(req).await;
    log_request(&request_id, &method, &path, response.status(), start.elapsed());

    response
}

/// Console output plus two daily-rolling files under `LOG_DIR`:
/// `scholaris.log` (errors only) and `scholaris.json` (info and up, JSON).
pub fn init_tracing() {
    if !is_observability_enabled() {
        init_console_logging();
        return;
    }

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        init_console_logging();
        warn!(log_dir = %log_dir, error = %e, "Cannot create log directory, logging to console only");
        return;
    }

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(default_filter());

    let error_file = RollingFileAppender::new(Rotation::DAILY, &log_dir, "scholaris.log");
    let error_layer = fmt::layer()
        .with_writer(error_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_file = RollingFileAppender::new(Rotation::DAILY, &log_dir, "scholaris.json");
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_file)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    let initialized = tracing_subscriber::registry()
        .with(console_layer)
        .with(error_layer)
        .with(json_layer)
        .try_init();

    if initialized.is_ok() {
        info!(log_dir = %log_dir, "Tracing initialized with file logging");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_middleware_passes_response_through() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route(
                "/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .layer(middleware::from_fn(logging_middleware));

        let ok = app
            .clone()
            .oneshot(axum::http::Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let err = app
            .oneshot(axum::http::Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
