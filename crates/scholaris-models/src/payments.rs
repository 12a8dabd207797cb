//! Stub payment intents.
//!
//! There is no gateway behind these: an intent is created locally with a
//! `pi_` reference and a client secret derived from the server secret, and
//! capturing it records a paid [`FeePayment`](crate::fees::FeePayment).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::fees::FeePayment;
use crate::ids::{FeeStructureId, PaymentIntentId, StudentId, UserId};

text_enum!(
    PaymentIntentStatus {
        Created => "created",
        Captured => "captured",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    pub reference: String,
    pub student_id: StudentId,
    pub fee_structure_id: FeeStructureId,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentIntentDto {
    pub student_id: StudentId,
    pub fee_structure_id: FeeStructureId,
    /// Defaults to the outstanding balance on the fee structure
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CapturePaymentDto {
    #[validate(length(min = 4, max = 64))]
    pub reference: String,
    #[validate(length(equal = 64, message = "client_secret is malformed"))]
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntentResponse {
    #[serde(flatten)]
    pub intent: PaymentIntent,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CapturePaymentResponse {
    pub intent: PaymentIntent,
    pub payment: FeePayment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_dto_requires_full_secret() {
        let dto = CapturePaymentDto {
            reference: "pi_0123456789abcdef".to_string(),
            client_secret: "abc".to_string(),
        };
        assert!(dto.validate().is_err());

        let dto = CapturePaymentDto {
            client_secret: "a".repeat(64),
            ..dto
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_intent_amount_optional() {
        let dto: CreatePaymentIntentDto = serde_json::from_str(
            r#"{"student_id":"11111111-1111-1111-1111-111111111111","fee_structure_id":"22222222-2222-2222-2222-222222222222"}"#,
        )
        .unwrap();
        assert!(dto.amount.is_none());
        assert!(dto.validate().is_ok());
    }
}
