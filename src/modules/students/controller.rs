use anyhow::anyhow;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, MessageResponse, Paginated};
use scholaris_models::{StudentId, UserRole};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, StudentScopeQuery, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::utils::auth_helpers::resolve_student_id;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

/// Create a student account and profile
#[utoipa::path(
    post,
    path = "/api/admin/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = ApiResponse<Student>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Email or student number taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<ApiResponse<Student>>), AppError> {
    let student = StudentService::create_student(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Student created", student)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/students",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "Paginated students", body = ApiResponse<Paginated<Student>>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    ApiQuery(filters): ApiQuery<StudentFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Student>>>, AppError> {
    let students = StudentService::get_students(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Students retrieved", students)))
}

#[utoipa::path(
    get,
    path = "/api/admin/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = ApiResponse<Student>),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StudentId>,
) -> Result<Json<ApiResponse<Student>>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Student retrieved", student)))
}

#[utoipa::path(
    put,
    path = "/api/admin/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = ApiResponse<Student>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StudentId>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<ApiResponse<Student>>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::new("Student updated", student)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StudentId>,
) -> Result<Json<MessageResponse>, AppError> {
    StudentService::delete_student(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Student deleted")))
}

/// The caller's own profile, or a child's profile for parents
#[utoipa::path(
    get,
    path = "/api/student/profile",
    params(StudentScopeQuery),
    responses(
        (status = 200, description = "Student profile", body = ApiResponse<Student>),
        (status = 400, description = "Parent did not name a child", body = ErrorResponse),
        (status = 403, description = "Not the caller's child", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(scope): ApiQuery<StudentScopeQuery>,
) -> Result<Json<ApiResponse<Student>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, scope.student_id).await?;
    let student = StudentService::get_student(&state.db, student_id).await?;
    Ok(Json(ApiResponse::new("Profile retrieved", student)))
}

#[utoipa::path(
    get,
    path = "/api/student/children",
    responses(
        (status = 200, description = "Students linked to this parent", body = ApiResponse<Vec<Student>>),
        (status = 403, description = "Parents only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_children(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<Student>>>, AppError> {
    if !auth_user.is(UserRole::Parent) {
        return Err(AppError::forbidden(anyhow!("Only parent accounts have children")));
    }

    let children = StudentService::get_children(&state.db, auth_user.user_id()?).await?;
    Ok(Json(ApiResponse::new("Children retrieved", children)))
}
