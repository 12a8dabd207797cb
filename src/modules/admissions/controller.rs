use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, Paginated};
use scholaris_models::AdmissionId;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::admissions::model::{
    Admission, AdmissionFilterParams, AdmissionStatusLookup, ApproveAdmissionDto,
    RejectAdmissionDto, SubmitAdmissionDto, SubmitAdmissionResponse, UpdateAdmissionStatusDto,
};
use crate::modules::admissions::service::AdmissionService;
use crate::state::AppState;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

/// Public admission form
#[utoipa::path(
    post,
    path = "/api/general/admissions",
    request_body = SubmitAdmissionDto,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<SubmitAdmissionResponse>),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "General"
)]
#[instrument(skip(state, dto))]
pub async fn submit_admission(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SubmitAdmissionDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubmitAdmissionResponse>>), AppError> {
    let response = AdmissionService::submit(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Application submitted", response)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/general/admissions/{application_number}",
    params(("application_number" = String, Path, description = "Application number, e.g. ADM-2025-004217")),
    responses(
        (status = 200, description = "Application status", body = ApiResponse<AdmissionStatusLookup>),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    tag = "General"
)]
#[instrument(skip(state))]
pub async fn lookup_admission(
    State(state): State<AppState>,
    ApiPath(application_number): ApiPath<String>,
) -> Result<Json<ApiResponse<AdmissionStatusLookup>>, AppError> {
    let status = AdmissionService::lookup_status(&state.db, &application_number).await?;
    Ok(Json(ApiResponse::new("Application status retrieved", status)))
}

#[utoipa::path(
    get,
    path = "/api/admin/admissions",
    params(AdmissionFilterParams),
    responses(
        (status = 200, description = "Paginated applications", body = ApiResponse<Paginated<Admission>>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admissions"
)]
#[instrument(skip(state))]
pub async fn get_admissions(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<AdmissionFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Admission>>>, AppError> {
    let admissions = AdmissionService::get_admissions(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Applications retrieved", admissions)))
}

#[utoipa::path(
    get,
    path = "/api/admin/admissions/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application details", body = ApiResponse<Admission>),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admissions"
)]
#[instrument(skip(state))]
pub async fn get_admission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AdmissionId>,
) -> Result<Json<ApiResponse<Admission>>, AppError> {
    let admission = AdmissionService::get_admission(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Application retrieved", admission)))
}

#[utoipa::path(
    post,
    path = "/api/admin/admissions/{id}/approve",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ApproveAdmissionDto,
    responses(
        (status = 200, description = "Application approved", body = ApiResponse<Admission>),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already decided", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admissions"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn approve_admission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<AdmissionId>,
    ValidatedJson(dto): ValidatedJson<ApproveAdmissionDto>,
) -> Result<Json<ApiResponse<Admission>>, AppError> {
    let admission =
        AdmissionService::approve(&state.db, id, auth_user.user_id()?, dto.remarks).await?;
    Ok(Json(ApiResponse::new("Application approved", admission)))
}

#[utoipa::path(
    post,
    path = "/api/admin/admissions/{id}/reject",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = RejectAdmissionDto,
    responses(
        (status = 200, description = "Application rejected", body = ApiResponse<Admission>),
        (status = 400, description = "Reason missing", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already decided", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admissions"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn reject_admission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<AdmissionId>,
    ValidatedJson(dto): ValidatedJson<RejectAdmissionDto>,
) -> Result<Json<ApiResponse<Admission>>, AppError> {
    let admission = AdmissionService::reject(
        &state.db,
        id,
        auth_user.user_id()?,
        dto.reason,
        dto.remarks,
    )
    .await?;
    Ok(Json(ApiResponse::new("Application rejected", admission)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/admissions/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateAdmissionStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Admission>),
        (status = 400, description = "Decisions go through approve/reject", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admissions"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_admission_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<AdmissionId>,
    ValidatedJson(dto): ValidatedJson<UpdateAdmissionStatusDto>,
) -> Result<Json<ApiResponse<Admission>>, AppError> {
    let admission = AdmissionService::update_status(
        &state.db,
        id,
        auth_user.user_id()?,
        dto.status,
        dto.remarks,
    )
    .await?;
    Ok(Json(ApiResponse::new("Application status updated", admission)))
}
