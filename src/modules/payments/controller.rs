use axum::{Json, extract::State, http::StatusCode};
use scholaris_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::payments::model::{
    CapturePaymentDto, CapturePaymentResponse, CreatePaymentIntentDto, PaymentIntentResponse,
};
use crate::modules::payments::service::PaymentService;
use crate::state::AppState;
use crate::utils::auth_helpers::resolve_student_id;
use crate::validator::ValidatedJson;

/// Create a payment intent for a fee
#[utoipa::path(
    post,
    path = "/api/payments/create",
    request_body = CreatePaymentIntentDto,
    responses(
        (status = 201, description = "Intent created with its client secret", body = ApiResponse<PaymentIntentResponse>),
        (status = 400, description = "Nothing outstanding or amount too large", body = ErrorResponse),
        (status = 403, description = "Not the caller's student", body = ErrorResponse),
        (status = 404, description = "Fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreatePaymentIntentDto>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentIntentResponse>>), AppError> {
    let student_id =
        resolve_student_id(&state.db, &auth_user, Some(dto.student_id.into_inner())).await?;

    let intent = PaymentService::create_intent(
        &state.db,
        &state.payment_config,
        auth_user.user_id()?,
        student_id,
        dto.fee_structure_id,
        dto.amount,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Payment intent created", intent)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/payments/capture",
    request_body = CapturePaymentDto,
    responses(
        (status = 200, description = "Payment captured and recorded", body = ApiResponse<CapturePaymentResponse>),
        (status = 400, description = "Invalid client secret", body = ErrorResponse),
        (status = 404, description = "Intent not found", body = ErrorResponse),
        (status = 409, description = "Already captured", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
#[instrument(skip(state, auth_user, dto), fields(reference = %dto.reference))]
pub async fn capture_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CapturePaymentDto>,
) -> Result<Json<ApiResponse<CapturePaymentResponse>>, AppError> {
    let captured = PaymentService::capture(
        &state.db,
        &state.payment_config,
        auth_user.user_id()?,
        auth_user.role()?,
        &dto.reference,
        &dto.client_secret,
    )
    .await?;
    Ok(Json(ApiResponse::new("Payment captured", captured)))
}
