use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::admissions::controller::{lookup_admission, submit_admission};
use crate::modules::general::controller::health;
use crate::state::AppState;

pub fn init_general_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/admissions", post(submit_admission))
        .route("/admissions/{application_number}", get(lookup_admission))
}
