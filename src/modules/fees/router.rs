use axum::{Router, routing::get};

use crate::modules::fees::controller::{
    create_fee_structure, delete_fee_structure, get_fee_payments, get_fee_structure,
    get_fee_structures, get_my_fee_payments, get_my_fee_summary, get_student_fee_summary,
    record_payment, update_fee_structure,
};
use crate::state::AppState;

/// Mounted under `/api/admin/fees`.
pub fn init_fees_router() -> Router<AppState> {
    Router::new()
        .route(
            "/structures",
            get(get_fee_structures).post(create_fee_structure),
        )
        .route(
            "/structures/{id}",
            get(get_fee_structure)
                .put(update_fee_structure)
                .delete(delete_fee_structure),
        )
        .route("/payments", get(get_fee_payments).post(record_payment))
        .route("/students/{student_id}/summary", get(get_student_fee_summary))
}

/// Mounted under `/api/student/fees`.
pub fn init_student_fees_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_my_fee_summary))
        .route("/payments", get(get_my_fee_payments))
}
