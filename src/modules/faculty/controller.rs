use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, MessageResponse, Paginated};
use scholaris_models::FacultyId;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::faculty::model::{
    CreateFacultyDto, Faculty, FacultyFilterParams, UpdateFacultyDto,
};
use crate::modules::faculty::service::FacultyService;
use crate::state::AppState;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/admin/faculty",
    request_body = CreateFacultyDto,
    responses(
        (status = 201, description = "Faculty member created", body = ApiResponse<Faculty>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email or employee number taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Faculty"
)]
#[instrument(skip(state, dto))]
pub async fn create_faculty(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateFacultyDto>,
) -> Result<(StatusCode, Json<ApiResponse<Faculty>>), AppError> {
    let faculty = FacultyService::create_faculty(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Faculty member created", faculty)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/faculty",
    params(FacultyFilterParams),
    responses(
        (status = 200, description = "Paginated faculty", body = ApiResponse<Paginated<Faculty>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Faculty"
)]
#[instrument(skip(state))]
pub async fn get_faculty_list(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<FacultyFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Faculty>>>, AppError> {
    let faculty = FacultyService::get_faculty_list(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Faculty retrieved", faculty)))
}

#[utoipa::path(
    get,
    path = "/api/admin/faculty/{id}",
    params(("id" = Uuid, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty details", body = ApiResponse<Faculty>),
        (status = 404, description = "Faculty member not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Faculty"
)]
#[instrument(skip(state))]
pub async fn get_faculty(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FacultyId>,
) -> Result<Json<ApiResponse<Faculty>>, AppError> {
    let faculty = FacultyService::get_faculty(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Faculty member retrieved", faculty)))
}

#[utoipa::path(
    put,
    path = "/api/admin/faculty/{id}",
    params(("id" = Uuid, Path, description = "Faculty ID")),
    request_body = UpdateFacultyDto,
    responses(
        (status = 200, description = "Faculty member updated", body = ApiResponse<Faculty>),
        (status = 404, description = "Faculty member not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Faculty"
)]
#[instrument(skip(state, dto))]
pub async fn update_faculty(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FacultyId>,
    ValidatedJson(dto): ValidatedJson<UpdateFacultyDto>,
) -> Result<Json<ApiResponse<Faculty>>, AppError> {
    let faculty = FacultyService::update_faculty(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::new("Faculty member updated", faculty)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/faculty/{id}",
    params(("id" = Uuid, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty member deleted", body = MessageResponse),
        (status = 404, description = "Faculty member not found", body = ErrorResponse),
        (status = 409, description = "Has recorded attendance", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Faculty"
)]
#[instrument(skip(state))]
pub async fn delete_faculty(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<FacultyId>,
) -> Result<Json<MessageResponse>, AppError> {
    FacultyService::delete_faculty(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Faculty member deleted")))
}

/// The calling faculty member's own profile
#[utoipa::path(
    get,
    path = "/api/faculty/profile",
    responses(
        (status = 200, description = "Faculty profile", body = ApiResponse<Faculty>),
        (status = 404, description = "No faculty profile for this account", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Faculty Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_faculty_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Faculty>>, AppError> {
    let faculty = FacultyService::get_by_user(&state.db, auth_user.user_id()?).await?;
    Ok(Json(ApiResponse::new("Profile retrieved", faculty)))
}
