use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::{Duration, Instant};

use crate::logging::is_observability_enabled;

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Installs the global Prometheus recorder and spawns its upkeep task.
/// Returns `None` when observability is disabled or a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .and_then(|builder| builder.install_recorder())
        .inspect_err(|e| tracing::warn!(error = %e, "Prometheus recorder not installed"))
        .ok()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

/// `GET /metrics` in Prometheus text format.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_login_success(role: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => role.to_string(), "status" => "success").increment(1);
}

pub fn track_login_failure(reason: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => "unknown", "status" => "failure", "reason" => reason.to_string())
        .increment(1);
}

pub fn track_attendance_recorded(created: usize, duplicates: usize, failed: usize) {
    if !is_observability_enabled() {
        return;
    }
    counter!("attendance_records_total", "outcome" => "created").increment(created as u64);
    counter!("attendance_records_total", "outcome" => "duplicate").increment(duplicates as u64);
    counter!("attendance_records_total", "outcome" => "failed").increment(failed as u64);
}

pub fn track_admission_submitted() {
    if !is_observability_enabled() {
        return;
    }
    counter!("admissions_submitted_total").increment(1);
}

pub fn track_admission_decision(status: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("admission_decisions_total", "status" => status.to_string()).increment(1);
}

/// `outcome` is `enrolled`, `duplicate` or `full`.
pub fn track_enrollment(outcome: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("course_enrollments_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn track_payment_captured(amount: i64) {
    if !is_observability_enabled() {
        return;
    }
    counter!("payments_captured_total").increment(1);
    counter!("payments_captured_amount_total").increment(amount.max(0) as u64);
}
