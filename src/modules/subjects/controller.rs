use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, MessageResponse, Paginated};
use scholaris_models::SubjectId;
use tracing::instrument;

use crate::middleware::auth::{AdminUser, AuthUser};
use crate::modules::subjects::model::{
    CreateSubjectDto, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use crate::modules::subjects::service::SubjectService;
use crate::state::AppState;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubjectDto,
    responses(
        (status = 201, description = "Subject created", body = ApiResponse<Subject>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Code already used", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn create_subject(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateSubjectDto>,
) -> Result<(StatusCode, Json<ApiResponse<Subject>>), AppError> {
    let subject = SubjectService::create_subject(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Subject created", subject)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    params(SubjectFilterParams),
    responses(
        (status = 200, description = "Paginated subjects", body = ApiResponse<Paginated<Subject>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_subjects(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiQuery(filters): ApiQuery<SubjectFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Subject>>>, AppError> {
    let subjects = SubjectService::get_subjects(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Subjects retrieved", subjects)))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject details", body = ApiResponse<Subject>),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_subject(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiPath(id): ApiPath<SubjectId>,
) -> Result<Json<ApiResponse<Subject>>, AppError> {
    let subject = SubjectService::get_subject(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Subject retrieved", subject)))
}

#[utoipa::path(
    put,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    request_body = UpdateSubjectDto,
    responses(
        (status = 200, description = "Subject updated", body = ApiResponse<Subject>),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn update_subject(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<SubjectId>,
    ValidatedJson(dto): ValidatedJson<UpdateSubjectDto>,
) -> Result<Json<ApiResponse<Subject>>, AppError> {
    let subject = SubjectService::update_subject(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::new("Subject updated", subject)))
}

#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted", body = MessageResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 409, description = "Subject has courses", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state, _admin))]
pub async fn delete_subject(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<SubjectId>,
) -> Result<Json<MessageResponse>, AppError> {
    SubjectService::delete_subject(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Subject deleted")))
}
