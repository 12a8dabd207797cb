use axum::{Router, routing::get};

use crate::modules::dashboard::controller::{get_admission_breakdown, get_dashboard_stats};
use crate::state::AppState;

pub fn init_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_dashboard_stats))
        .route("/admissions", get(get_admission_breakdown))
}
