use axum::{Router, routing::post};

use crate::modules::payments::controller::{capture_payment, create_payment_intent};
use crate::state::AppState;

pub fn init_payments_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_payment_intent))
        .route("/capture", post(capture_payment))
}
