use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use scholaris_core::{ApiResponse, AppError, ErrorResponse, MessageResponse, Paginated};
use scholaris_models::CalendarEventId;
use tracing::instrument;

use crate::middleware::auth::{AdminUser, AuthUser};
use crate::modules::calendar::model::{
    CalendarEvent, CalendarFilterParams, CreateCalendarEventDto, UpdateCalendarEventDto,
};
use crate::modules::calendar::service::CalendarService;
use crate::state::AppState;
use crate::validator::{ApiPath, ApiQuery, ValidatedJson};

/// Add an event to the academic calendar
#[utoipa::path(
    post,
    path = "/api/calendar",
    request_body = CreateCalendarEventDto,
    responses(
        (status = 201, description = "Event created", body = ApiResponse<CalendarEvent>),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, admin, dto))]
pub async fn create_event(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateCalendarEventDto>,
) -> Result<(StatusCode, Json<ApiResponse<CalendarEvent>>), AppError> {
    let event = CalendarService::create_event(&state.db, admin.0.user_id()?, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Event created", event)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/calendar",
    params(CalendarFilterParams),
    responses(
        (status = 200, description = "Events in date order", body = ApiResponse<Paginated<CalendarEvent>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_events(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiQuery(filters): ApiQuery<CalendarFilterParams>,
) -> Result<Json<ApiResponse<Paginated<CalendarEvent>>>, AppError> {
    let events = CalendarService::get_events(&state.db, filters).await?;
    Ok(Json(ApiResponse::new("Events retrieved", events)))
}

#[utoipa::path(
    get,
    path = "/api/calendar/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = ApiResponse<CalendarEvent>),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_event(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiPath(id): ApiPath<CalendarEventId>,
) -> Result<Json<ApiResponse<CalendarEvent>>, AppError> {
    let event = CalendarService::get_event(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Event retrieved", event)))
}

#[utoipa::path(
    put,
    path = "/api/calendar/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateCalendarEventDto,
    responses(
        (status = 200, description = "Event updated", body = ApiResponse<CalendarEvent>),
        (status = 400, description = "End date before start date", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, _admin, dto))]
pub async fn update_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<CalendarEventId>,
    ValidatedJson(dto): ValidatedJson<UpdateCalendarEventDto>,
) -> Result<Json<ApiResponse<CalendarEvent>>, AppError> {
    let event = CalendarService::update_event(&state.db, id, dto).await?;
    Ok(Json(ApiResponse::new("Event updated", event)))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, _admin))]
pub async fn delete_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<CalendarEventId>,
) -> Result<Json<MessageResponse>, AppError> {
    CalendarService::delete_event(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Event deleted")))
}
