use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::modules::admissions::controller::{
    approve_admission, get_admission, get_admissions, reject_admission, update_admission_status,
};
use crate::state::AppState;

/// Review routes, mounted under `/api/admin/admissions`. Public submission
/// and lookup live in the general router.
pub fn init_admissions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_admissions))
        .route("/{id}", get(get_admission))
        .route("/{id}/approve", post(approve_admission))
        .route("/{id}/reject", post(reject_admission))
        .route("/{id}/status", patch(update_admission_status))
}
