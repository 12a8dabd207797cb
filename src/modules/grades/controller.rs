use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, Paginated};
use scholaris_models::GradeId;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::grades::model::{CreateGradeDto, Grade, GradeFilterParams, UpdateGradeDto};
use crate::modules::grades::service::GradeService;
use crate::state::AppState;
use crate::utils::auth_helpers::{current_faculty_id, ensure_course_access, resolve_student_id};
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

/// Record a grade; percentage and letter grade are derived from the marks
#[utoipa::path(
    post,
    path = "/api/faculty/grades",
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade recorded", body = ApiResponse<Grade>),
        (status = 400, description = "Validation failed or student not enrolled", body = ErrorResponse),
        (status = 403, description = "Not the course's teacher", body = ErrorResponse),
        (status = 409, description = "Assessment already graded", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateGradeDto>,
) -> Result<(StatusCode, Json<ApiResponse<Grade>>), AppError> {
    let faculty_id = ensure_course_access(&state.db, &auth_user, dto.course_id).await?;
    let grade = GradeService::create_grade(&state.db, faculty_id, dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new("Grade recorded", grade))))
}

#[utoipa::path(
    put,
    path = "/api/faculty/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Grade updated", body = ApiResponse<Grade>),
        (status = 400, description = "Marks exceed maximum", body = ErrorResponse),
        (status = 403, description = "Not the course's teacher", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<GradeId>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<ApiResponse<Grade>>, AppError> {
    let current = GradeService::get_grade(&state.db, id).await?;
    ensure_course_access(&state.db, &auth_user, current.course_id).await?;

    let grade = GradeService::update_grade(&state.db, current, dto).await?;
    Ok(Json(ApiResponse::new("Grade updated", grade)))
}

#[utoipa::path(
    get,
    path = "/api/faculty/grades",
    params(GradeFilterParams),
    responses(
        (status = 200, description = "Paginated grades", body = ApiResponse<Paginated<Grade>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Grades"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(filters): ApiQuery<GradeFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Grade>>>, AppError> {
    let teacher = current_faculty_id(&state.db, &auth_user).await?;
    let grades = GradeService::get_grades(&state.db, teacher, filters).await?;
    Ok(Json(ApiResponse::new("Grades retrieved", grades)))
}

#[utoipa::path(
    get,
    path = "/api/student/grades",
    params(GradeFilterParams),
    responses(
        (status = 200, description = "The student's grades", body = ApiResponse<Paginated<Grade>>),
        (status = 403, description = "Not the caller's record", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(mut filters): ApiQuery<GradeFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Grade>>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, filters.student_id).await?;
    filters.student_id = Some(student_id.into_inner());

    let grades = GradeService::get_grades(&state.db, None, filters).await?;
    Ok(Json(ApiResponse::new("Grades retrieved", grades)))
}
