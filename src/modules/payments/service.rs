use anyhow::anyhow;
use rand::RngCore;
use scholaris_config::PaymentConfig;
use scholaris_core::AppError;
use scholaris_db::PgPool;
use scholaris_models::fees::PaymentMethod;
use scholaris_models::{FeeStructureId, StudentId, UserId, UserRole};
use scholaris_observability::track_payment_captured;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::modules::fees::service::{FeeService, NewPayment};
use crate::modules::payments::model::{
    CapturePaymentResponse, PaymentIntent, PaymentIntentResponse,
};

const INTENT_COLUMNS: &str = "id, reference, student_id, fee_structure_id, amount, currency, status, created_by, created_at, captured_at";

/// `pi_` followed by 24 hex characters.
pub fn new_reference() -> String {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("pi_{}", hex::encode(bytes))
}

/// `hex(sha256("<secret>:<reference>"))`
pub fn client_secret(gateway_secret: &str, reference: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(gateway_secret.as_bytes());
    hasher.update(b":");
    hasher.update(reference.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct PaymentService;

impl PaymentService {
    /// Creates an intent for the outstanding balance, or for `amount` when given.
    #[instrument(skip(db, config))]
    pub async fn create_intent(
        db: &PgPool,
        config: &PaymentConfig,
        created_by: UserId,
        student_id: StudentId,
        fee_structure_id: FeeStructureId,
        amount: Option<i64>,
    ) -> Result<PaymentIntentResponse, AppError> {
        let outstanding = FeeService::outstanding(db, student_id, fee_structure_id).await?;
        if outstanding == 0 {
            return Err(AppError::bad_request(anyhow!(
                "Nothing is outstanding on this fee"
            )));
        }

        let amount = amount.unwrap_or(outstanding);
        if amount > outstanding {
            return Err(AppError::bad_request(anyhow!(
                "amount exceeds the outstanding balance of {outstanding}"
            )));
        }

        let reference = new_reference();
        let sql = format!(
            r#"INSERT INTO payment_intents (reference, student_id, fee_structure_id, amount,
                                            currency, created_by)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {INTENT_COLUMNS}"#
        );

        let intent = sqlx::query_as::<_, PaymentIntent>(&sql)
            .bind(&reference)
            .bind(student_id)
            .bind(fee_structure_id)
            .bind(amount)
            .bind(&config.currency)
            .bind(created_by)
            .fetch_one(db)
            .await?;

        info!(reference = %intent.reference, amount, "Payment intent created");

        Ok(PaymentIntentResponse {
            client_secret: client_secret(&config.gateway_secret, &intent.reference),
            intent,
        })
    }

    /// Verifies the client secret, marks the intent captured and records a
    /// paid fee payment, all in one transaction. A second capture is a 409.
    #[instrument(skip(db, config, secret))]
    pub async fn capture(
        db: &PgPool,
        config: &PaymentConfig,
        caller: UserId,
        caller_role: UserRole,
        reference: &str,
        secret: &str,
    ) -> Result<CapturePaymentResponse, AppError> {
        let intent = sqlx::query_as::<_, PaymentIntent>(&format!(
            "SELECT {INTENT_COLUMNS} FROM payment_intents WHERE reference = $1"
        ))
        .bind(reference)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Payment intent not found")))?;

        if caller_role != UserRole::Admin && intent.created_by != caller {
            return Err(AppError::forbidden(anyhow!(
                "This payment intent belongs to another account"
            )));
        }

        if client_secret(&config.gateway_secret, &intent.reference) != secret {
            warn!(reference, "Client secret mismatch");
            return Err(AppError::bad_request(anyhow!("Invalid client secret")));
        }

        let mut tx = db.begin().await?;

        let captured = sqlx::query_as::<_, PaymentIntent>(&format!(
            r#"UPDATE payment_intents SET status = 'captured', captured_at = NOW()
               WHERE id = $1 AND status = 'created'
               RETURNING {INTENT_COLUMNS}"#
        ))
        .bind(intent.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::conflict(anyhow!("Payment has already been captured")))?;

        let payment = FeeService::insert_payment(
            &mut tx,
            NewPayment {
                student_id: captured.student_id,
                fee_structure_id: captured.fee_structure_id,
                amount: captured.amount,
                method: PaymentMethod::Online,
                transaction_ref: Some(&captured.reference),
                paid_at: None,
                recorded_by: caller,
            },
        )
        .await?;

        tx.commit().await?;

        track_payment_captured(captured.amount);
        info!(reference = %captured.reference, payment_id = %payment.id, "Payment captured");

        Ok(CapturePaymentResponse {
            intent: captured,
            payment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_format() {
        let reference = new_reference();
        assert!(reference.starts_with("pi_"));
        assert_eq!(reference.len(), 27);
        assert!(reference[3..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(reference, new_reference());
    }

    #[test]
    fn test_client_secret_is_deterministic() {
        let a = client_secret("secret", "pi_abc");
        assert_eq!(a, client_secret("secret", "pi_abc"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_client_secret_depends_on_both_inputs() {
        let base = client_secret("secret", "pi_abc");
        assert_ne!(base, client_secret("other", "pi_abc"));
        assert_ne!(base, client_secret("secret", "pi_abd"));
    }

    #[test]
    fn test_client_secret_known_value() {
        // sha256("s:r")
        let mut hasher = Sha256::new();
        hasher.update(b"s:r");
        assert_eq!(client_secret("s", "r"), hex::encode(hasher.finalize()));
    }
}
