use anyhow::anyhow;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, Paginated};
use scholaris_models::students::StudentScopeQuery;
use scholaris_models::{AttendanceId, CourseId, StudentId};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::attendance::model::{
    Attendance, AttendanceFilterParams, AttendancePercentage, AttendancePercentageQuery,
    AttendanceSummary, RecordAttendanceDto, RecordAttendanceResult, UpdateAttendanceRemarksDto,
};
use crate::modules::attendance::service::AttendanceService;
use crate::state::AppState;
use crate::utils::auth_helpers::{current_faculty_id, ensure_course_access, resolve_student_id};
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

fn required_course(query: &AttendancePercentageQuery) -> Result<CourseId, AppError> {
    query
        .course_id
        .map(CourseId::from_uuid)
        .ok_or_else(|| AppError::bad_request(anyhow!("course_id is required")))
}

/// Submit a roll. Existing (student, course, date) records are skipped
#[utoipa::path(
    post,
    path = "/api/faculty/attendance",
    request_body = RecordAttendanceDto,
    responses(
        (status = 201, description = "Roll processed", body = ApiResponse<RecordAttendanceResult>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Not the course's teacher", body = ErrorResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn record_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<RecordAttendanceDto>,
) -> Result<(StatusCode, Json<ApiResponse<RecordAttendanceResult>>), AppError> {
    let caller = current_faculty_id(&state.db, &auth_user).await?;
    let result =
        AttendanceService::record_attendance(&state.db, auth_user.user_id()?, caller, dto).await?;

    let message = format!(
        "{} recorded, {} duplicates skipped, {} failed",
        result.created, result.duplicates, result.failed
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::new(message, result))))
}

#[utoipa::path(
    get,
    path = "/api/faculty/attendance",
    params(AttendanceFilterParams),
    responses(
        (status = 200, description = "Paginated attendance", body = ApiResponse<Paginated<Attendance>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(filters): ApiQuery<AttendanceFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Attendance>>>, AppError> {
    let teacher = current_faculty_id(&state.db, &auth_user).await?;
    let records = AttendanceService::get_attendance(&state.db, teacher, filters).await?;
    Ok(Json(ApiResponse::new("Attendance retrieved", records)))
}

#[utoipa::path(
    patch,
    path = "/api/faculty/attendance/{id}/remarks",
    params(("id" = Uuid, Path, description = "Attendance record ID")),
    request_body = UpdateAttendanceRemarksDto,
    responses(
        (status = 200, description = "Remarks updated", body = ApiResponse<Attendance>),
        (status = 403, description = "Not the course's teacher", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_attendance_remarks(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<AttendanceId>,
    ValidatedJson(dto): ValidatedJson<UpdateAttendanceRemarksDto>,
) -> Result<Json<ApiResponse<Attendance>>, AppError> {
    let course_id = AttendanceService::get_course_of(&state.db, id).await?;
    ensure_course_access(&state.db, &auth_user, course_id).await?;

    let record = AttendanceService::update_remarks(&state.db, id, dto.remarks).await?;
    Ok(Json(ApiResponse::new("Remarks updated", record)))
}

/// Percentage for one student in one course the caller teaches
#[utoipa::path(
    get,
    path = "/api/faculty/attendance/percentage",
    params(StudentScopeQuery, AttendancePercentageQuery),
    responses(
        (status = 200, description = "Attendance percentage", body = ApiResponse<AttendancePercentage>),
        (status = 400, description = "student_id or course_id missing", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_attendance_percentage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(scope): ApiQuery<StudentScopeQuery>,
    ApiQuery(query): ApiQuery<AttendancePercentageQuery>,
) -> Result<Json<ApiResponse<AttendancePercentage>>, AppError> {
    let student_id = scope
        .student_id
        .map(StudentId::from_uuid)
        .ok_or_else(|| AppError::bad_request(anyhow!("student_id is required")))?;
    let course_id = required_course(&query)?;
    ensure_course_access(&state.db, &auth_user, course_id).await?;

    let percentage = AttendanceService::calculate_attendance_percentage(
        &state.db,
        student_id,
        course_id,
        query.academic_year.as_deref(),
        query.session,
    )
    .await?;
    Ok(Json(ApiResponse::new("Attendance percentage calculated", percentage)))
}

#[utoipa::path(
    get,
    path = "/api/student/attendance",
    params(AttendanceFilterParams),
    responses(
        (status = 200, description = "The student's attendance", body = ApiResponse<Paginated<Attendance>>),
        (status = 403, description = "Not the caller's record", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(mut filters): ApiQuery<AttendanceFilterParams>,
) -> Result<Json<ApiResponse<Paginated<Attendance>>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, filters.student_id).await?;
    filters.student_id = Some(student_id.into_inner());

    let records = AttendanceService::get_attendance(&state.db, None, filters).await?;
    Ok(Json(ApiResponse::new("Attendance retrieved", records)))
}

#[utoipa::path(
    get,
    path = "/api/student/attendance/summary",
    params(StudentScopeQuery, AttendancePercentageQuery),
    responses(
        (status = 200, description = "Per-course attendance summary", body = ApiResponse<Vec<AttendanceSummary>>),
        (status = 403, description = "Not the caller's record", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_attendance_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(scope): ApiQuery<StudentScopeQuery>,
    ApiQuery(query): ApiQuery<AttendancePercentageQuery>,
) -> Result<Json<ApiResponse<Vec<AttendanceSummary>>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, scope.student_id).await?;
    let summary = AttendanceService::get_summary(
        &state.db,
        student_id,
        query.academic_year.as_deref(),
        query.session,
    )
    .await?;
    Ok(Json(ApiResponse::new("Attendance summary retrieved", summary)))
}

#[utoipa::path(
    get,
    path = "/api/student/attendance/percentage",
    params(StudentScopeQuery, AttendancePercentageQuery),
    responses(
        (status = 200, description = "Attendance percentage", body = ApiResponse<AttendancePercentage>),
        (status = 400, description = "course_id missing", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Student Portal"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_attendance_percentage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(scope): ApiQuery<StudentScopeQuery>,
    ApiQuery(query): ApiQuery<AttendancePercentageQuery>,
) -> Result<Json<ApiResponse<AttendancePercentage>>, AppError> {
    let student_id = resolve_student_id(&state.db, &auth_user, scope.student_id).await?;
    let course_id = required_course(&query)?;

    let percentage = AttendanceService::calculate_attendance_percentage(
        &state.db,
        student_id,
        course_id,
        query.academic_year.as_deref(),
        query.session,
    )
    .await?;
    Ok(Json(ApiResponse::new("Attendance percentage calculated", percentage)))
}
