use anyhow::anyhow;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, Paginated};
use scholaris_models::UserId;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{CreateUserDto, UpdateUserStatusDto, User, UserFilterParams};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

/// Create an account of any role
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<User>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    let user = UserService::create_user(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("User created", user)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Paginated users", body = ApiResponse<Paginated<User>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<UserFilterParams>,
) -> Result<Json<ApiResponse<Paginated<User>>>, AppError> {
    let users = UserService::get_users(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Users retrieved", users)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<User>),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = UserService::get_user(&state.db, id).await?;
    Ok(Json(ApiResponse::new("User retrieved", user)))
}

/// Activate or deactivate an account. Deactivated users cannot log in.
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<User>),
        (status = 400, description = "Cannot deactivate yourself", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user))]
pub async fn update_user_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserStatusDto>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    if !dto.is_active && auth_user.user_id()? == id {
        return Err(AppError::bad_request(anyhow!(
            "You cannot deactivate your own account"
        )));
    }

    let user = UserService::set_active(&state.db, id, dto.is_active).await?;
    let message = if user.is_active {
        "User activated"
    } else {
        "User deactivated"
    };
    Ok(Json(ApiResponse::new(message, user)))
}
