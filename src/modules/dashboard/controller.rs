use axum::{Json, extract::State};
use scholaris_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;

use crate::modules::dashboard::model::{AdmissionBreakdown, DashboardStats};
use crate::modules::dashboard::service::DashboardService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/stats",
    responses(
        (status = 200, description = "School-wide counts", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = DashboardService::get_stats(&state.db).await?;
    Ok(Json(ApiResponse::new("Dashboard statistics retrieved", stats)))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/admissions",
    responses(
        (status = 200, description = "Applications per status", body = ApiResponse<AdmissionBreakdown>),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_admission_breakdown(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AdmissionBreakdown>>, AppError> {
    let breakdown = DashboardService::get_admission_breakdown(&state.db).await?;
    Ok(Json(ApiResponse::new("Admission breakdown retrieved", breakdown)))
}
