use axum::Json;
use scholaris_core::ApiResponse;

use crate::modules::general::model::HealthStatus;

/// Liveness probe; does not touch the database.
#[utoipa::path(
    get,
    path = "/api/general/health",
    responses(
        (status = 200, description = "Service is up", body = ApiResponse<HealthStatus>)
    ),
    tag = "General"
)]
pub async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::new("Service is healthy", HealthStatus::ok()))
}
