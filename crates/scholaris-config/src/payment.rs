//! Settings for the mock payment gateway.
//!
//! There is no real processor behind `/api/payments`. The secret only signs
//! the client secrets handed out with each payment intent so that a capture
//! can prove it came from the client that created the intent.

use crate::env::string_or;

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub gateway_secret: String,
    /// ISO 4217 code stamped on every intent
    pub currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            gateway_secret: "scholaris-mock-gateway-secret".to_string(),
            currency: "INR".to_string(),
        }
    }
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gateway_secret: string_or("PAYMENT_GATEWAY_SECRET", &defaults.gateway_secret),
            currency: string_or("PAYMENT_CURRENCY", &defaults.currency).to_uppercase(),
        }
    }
}
