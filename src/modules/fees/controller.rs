use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, MessageResponse, Paginated};
use scholaris_models::students::StudentScopeQuery;
use scholaris_models::{FeeStructureId, StudentId};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::fees::model::{
    CreateFeeStructureDto, FeePayment, FeePaymentFilterParams, FeeStructure,
    FeeStructureFilterParams, FeeSummaryQuery, RecordPaymentDto, StudentFeeSummary,
    UpdateFeeStructureDto,
};
use crate::modules::fees::service::FeeService;
use crate::state::AppState;
use crate::utils::auth_helpers::resolve_student_id;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/admin/fees/structures",
    request_body = CreateFeeStructureDto,
    responses(
        (status = 201, description = "Fee structure created", body = ApiResponse<FeeStructure>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Duplicate fee for grade and year", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, dto))]
pub async fn create_fee_structure(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateFeeStructureDto>,
) -> Result<(StatusCode, Json<ApiResponse<FeeStructure>>), AppError> {
    let structure = FeeService::create_structure(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Fee structure created", structure)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/fees/structures",
    params(FeeStructureFilterParams),
    responses(
        (status = 200, description = "Paginated fee structures", body = ApiResponse<Paginated<FeeStructure>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn get_fee_structures(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<FeeStructureFilterParams>,
) -> Result<Json<ApiResponse<Paginated<FeeStructure>>>, AppError> {
    let structures = FeeService::get_structures(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Fee structures retrieved", structures)))
}

#[utoipa::path(
    get,
    path = "/api/admin/fees/structures/{id}",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    responses(
        (status = 200, description = "Fee structure", body = ApiResponse<FeeStructure>),
        (status = 404, description = "Fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn get_fee_structure(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FeeStructureId>,
) -> Result<Json<ApiResponse<FeeStructure>>, AppError> {
    let structure = FeeService::get_structure(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Fee structure retrieved", structure)))
}

#[utoipa::path(
    put,
    path = "/api/admin/fees/structures/{id}",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    request_body = UpdateFeeStructureDto,
    responses(
        (status = 200, description = "Fee structure updated", body = ApiResponse<FeeStructure>),
        (status = 404, description = "Fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, dto))]
pub async fn update_fee_structure(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FeeStructureId>,
    ValidatedJson(dto): ValidatedJson<UpdateFeeStructureDto>,
) -> Result<Json<ApiResponse<FeeStructure>>, AppError> {
    let structure = FeeService::update_structure(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::new("Fee structure updated", structure)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/fees/structures/{id}",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    responses(
        (status = 200, description = "Fee structure deleted", body = MessageResponse),
        (status = 404, description = "Fee structure not found", body = ErrorResponse),
        (status = 409, description = "Payments exist", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn delete_fee_structure(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FeeStructureId>,
) -> Result<Json<MessageResponse>, AppError> {
    FeeService::delete_structure(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Fee structure deleted")))
}

/// Record a payment taken at the office
#[utoipa::path(
    post,
    path = "/api/admin/fees/payments",
    request_body = RecordPaymentDto,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<FeePayment>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Student or fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn record_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<RecordPaymentDto>,
) -> Result<(StatusCode, Json<ApiResponse<FeePayment>>), AppError> {
    let payment = FeeService::record_payment(&state.db, auth_user.user_id()?, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Payment recorded", payment)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/fees/payments",
    params(FeePaymentFilterParams),
    responses(
        (status = 200, description = "Paginated payments", body = ApiResponse<Paginated<FeePayment>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn get_fee_payments(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<FeePaymentFilterParams>,
) -> Result<Json<ApiResponse<Paginated<FeePayment>>>, AppError> {
    let payments = FeeService::get_payments(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Payments retrieved", payments)))
}

#[utoipa::path(
    get,
    path = "/api/admin/fees/students/{student_id}/summary",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        FeeSummaryQuery
    ),
    responses(
        (status = 200, description = "Fee summary", body = ApiResponse<StudentFeeSummary>),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state))]
pub async fn get_student_fee_summary(
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<StudentId>,
    ApiQuery(query): ApiQuery<FeeSummaryQuery>,
) -> Result<Json<ApiResponse<StudentFeeSummary>>, AppError> {
    let summary = FeeService::get_summary(&state.db, student_id, query.academic_year).await?;
    Ok(Json(ApiResponse::new("Fee summary retrieved", summary)))
}

#[utoipa::path(
    get,
    path = "/api/student/fees",
    params(StudentScopeQuery, FeeSummaryQuery),
    responses(
        (status = 200, description = "Total due, paid and balance", body = ApiResponse<StudentFeeSummary>),
        (status = 403, description = "Not the caller's record", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_fee_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(scope): ApiQuery<StudentScopeQuery>,
    ApiQuery(query): ApiQuery<FeeSummaryQuery>,
) -> Result<Json<ApiResponse<StudentFeeSummary>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, scope.student_id).await?;
    let summary = FeeService::get_summary(&state.db, student_id, query.academic_year).await?;
    Ok(Json(ApiResponse::new("Fee summary retrieved", summary)))
}

#[utoipa::path(
    get,
    path = "/api/student/fees/payments",
    params(FeePaymentFilterParams),
    responses(
        (status = 200, description = "The student's payments", body = ApiResponse<Paginated<FeePayment>>),
        (status = 403, description = "Not the caller's record", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_fee_payments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(mut filters): ApiQuery<FeePaymentFilterParams>,
) -> Result<Json<ApiResponse<Paginated<FeePayment>>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, filters.student_id).await?;
    filters.student_id = Some(student_id.into_inner());

    let payments = FeeService::get_payments(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Payments retrieved", payments)))
}
