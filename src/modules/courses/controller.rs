use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, MessageResponse, Paginated};
use scholaris_models::{CourseId, StudentId};
use scholaris_models::students::StudentScopeQuery;
use tracing::instrument;

use crate::middleware::auth::{AdminUser, AuthUser};
use crate::middleware::role::{STAFF, check_any_role};
use crate::modules::courses::model::{
    Course, CourseFilterParams, CreateCourseDto, EnrollStudentDto, EnrolledStudent, Enrollment,
    UpdateCourseDto,
};
use crate::modules::courses::service::CourseService;
use crate::state::AppState;
use crate::utils::auth_helpers::{current_faculty_id, ensure_course_access, resolve_student_id};
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = ApiResponse<Course>),
        (status = 400, description = "Validation failed or unknown subject", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Code already used", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), AppError> {
    let course = CourseService::create_course(&state.db, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Course created", course)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseFilterParams),
    responses(
        (status = 200, description = "Paginated courses", body = ApiResponse<Paginated<Course>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_courses(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiQuery(filters): ApiQuery<CourseFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Course>>>, AppError> {
    let courses = CourseService::get_courses(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Courses retrieved", courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = ApiResponse<Course>),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiPath(id): ApiPath<CourseId>,
) -> Result<Json<ApiResponse<Course>>, AppError> {
    let course = CourseService::get_course(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Course retrieved", course)))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = ApiResponse<Course>),
        (status = 400, description = "Capacity below current enrollment", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn update_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<CourseId>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<ApiResponse<Course>>, AppError> {
    let course = CourseService::update_course(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::new("Course updated", course)))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _admin))]
pub async fn delete_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<CourseId>,
) -> Result<Json<MessageResponse>, AppError> {
    CourseService::delete_course(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Course deleted")))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = EnrollStudentDto,
    responses(
        (status = 201, description = "Student enrolled", body = ApiResponse<Enrollment>),
        (status = 400, description = "Already enrolled or course full", body = ErrorResponse),
        (status = 404, description = "Course or student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn enroll_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<CourseId>,
    ValidatedJson(dto): ValidatedJson<EnrollStudentDto>,
) -> Result<(StatusCode, Json<ApiResponse<Enrollment>>), AppError> {
    let enrollment = CourseService::enroll_student(&state.db, id, dto.student_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Student enrolled", enrollment)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}/enroll/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Course ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student removed from the course", body = MessageResponse),
        (status = 400, description = "Not enrolled", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _admin))]
pub async fn unenroll_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath((id, student_id)): ApiPath<(CourseId, StudentId)>,
) -> Result<Json<MessageResponse>, AppError> {
    CourseService::unenroll_student(&state.db, id, student_id).await?;
    Ok(Json(MessageResponse::new("Student removed from the course")))
}

/// Roster for admins, or for the faculty member teaching the course
#[utoipa::path(
    get,
    path = "/api/courses/{id}/students",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled students", body = ApiResponse<Vec<EnrolledStudent>>),
        (status = 403, description = "Not staff, or not the course's teacher", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<CourseId>,
) -> Result<Json<ApiResponse<Vec<EnrolledStudent>>>, AppError> {
    check_any_role(&auth_user, STAFF)?;
    ensure_course_access(&state.db, &auth_user, id).await?;

    let roster = CourseService::get_roster(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Roster retrieved", roster)))
}

#[utoipa::path(
    get,
    path = "/api/faculty/courses",
    params(CourseFilterParams),
    responses(
        (status = 200, description = "Courses taught by the caller", body = ApiResponse<Paginated<Course>>),
        (status = 403, description = "No faculty profile", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Faculty Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(filters): ApiQuery<CourseFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Course>>>, AppError> {
    let faculty_id = current_faculty_id(&state.db, &auth_user).await?;
    let courses = CourseService::get_courses_taught(&state.db, faculty_id, filters).await?;
    Ok(Json(ApiResponse::new("Courses retrieved", courses)))
}

#[utoipa::path(
    get,
    path = "/api/student/courses",
    params(StudentScopeQuery),
    responses(
        (status = 200, description = "Courses the student is enrolled in", body = ApiResponse<Vec<Course>>),
        (status = 403, description = "Not the caller's record", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(scope): ApiQuery<StudentScopeQuery>,
) -> Result<Json<ApiResponse<Vec<Course>>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, scope.student_id).await?;
    let courses = CourseService::get_student_courses(&state.db, student_id).await?;
    Ok(Json(ApiResponse::new("Courses retrieved", courses)))
}
