use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, MessageResponse, Paginated};
use scholaris_models::{StudentId, TransportRouteId};
use tracing::instrument;

use crate::middleware::auth::{AdminUser, AuthUser};
use crate::modules::transport::model::{
    AssignStudentDto, CreateTransportRouteDto, TransportFilterParams, TransportRoute,
    UpdateTransportRouteDto,
};
use crate::modules::transport::service::TransportService;
use crate::state::AppState;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/transport",
    request_body = CreateTransportRouteDto,
    responses(
        (status = 201, description = "Route created", body = ApiResponse<TransportRoute>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Route name taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transport"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn create_route(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateTransportRouteDto>,
) -> Result<(StatusCode, Json<ApiResponse<TransportRoute>>), AppError> {
    let route = TransportService::create_route(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Route created", route)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/transport",
    params(TransportFilterParams),
    responses(
        (status = 200, description = "Paginated routes", body = ApiResponse<Paginated<TransportRoute>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Transport"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_routes(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiQuery(filters): ApiQuery<TransportFilterParams>,
) -> Result<Json<ApiResponse<Paginated<TransportRoute>>>, AppError> {
    let routes = TransportService::get_routes(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Routes retrieved", routes)))
}

#[utoipa::path(
    get,
    path = "/api/transport/{id}",
    params(("id" = Uuid, Path, description = "Route ID")),
    responses(
        (status = 200, description = "Route details", body = ApiResponse<TransportRoute>),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transport"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_route(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiPath(id): ApiPath<TransportRouteId>,
) -> Result<Json<ApiResponse<TransportRoute>>, AppError> {
    let route = TransportService::get_route(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Route retrieved", route)))
}

#[utoipa::path(
    put,
    path = "/api/transport/{id}",
    params(("id" = Uuid, Path, description = "Route ID")),
    request_body = UpdateTransportRouteDto,
    responses(
        (status = 200, description = "Route updated", body = ApiResponse<TransportRoute>),
        (status = 400, description = "Capacity below riders", body = ErrorResponse),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transport"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn update_route(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<TransportRouteId>,
    ValidatedJson(dto): ValidatedJson<UpdateTransportRouteDto>,
) -> Result<Json<ApiResponse<TransportRoute>>, AppError> {
    let route = TransportService::update_route(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::new("Route updated", route)))
}

#[utoipa::path(
    delete,
    path = "/api/transport/{id}",
    params(("id" = Uuid, Path, description = "Route ID")),
    responses(
        (status = 200, description = "Route deleted", body = MessageResponse),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transport"
)]
#[instrument(skip(state, _admin))]
pub async fn delete_route(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<TransportRouteId>,
) -> Result<Json<MessageResponse>, AppError> {
    TransportService::delete_route(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Route deleted")))
}

#[utoipa::path(
    post,
    path = "/api/transport/{id}/assign",
    params(("id" = Uuid, Path, description = "Route ID")),
    request_body = AssignStudentDto,
    responses(
        (status = 200, description = "Student assigned", body = ApiResponse<TransportRoute>),
        (status = 400, description = "Already assigned, full or inactive", body = ErrorResponse),
        (status = 404, description = "Route or student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transport"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn assign_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<TransportRouteId>,
    ValidatedJson(dto): ValidatedJson<AssignStudentDto>,
) -> Result<Json<ApiResponse<TransportRoute>>, AppError> {
    let route = TransportService::assign_student(&state.db, id, dto.student_id).await?;
    Ok(Json(ApiResponse::new("Student assigned to route", route)))
}

#[utoipa::path(
    delete,
    path = "/api/transport/{id}/assign/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Route ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student removed from route", body = MessageResponse),
        (status = 400, description = "Not assigned to this route", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transport"
)]
#[instrument(skip(state, _admin))]
pub async fn unassign_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath((id, student_id)): ApiPath<(TransportRouteId, StudentId)>,
) -> Result<Json<MessageResponse>, AppError> {
    TransportService::unassign_student(&state.db, id, student_id).await?;
    Ok(Json(MessageResponse::new("Student removed from route")))
}
