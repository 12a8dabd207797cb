use axum::{
    Router,
    routing::{get, patch},
};

use crate::modules::attendance::controller::{
    get_attendance, get_attendance_percentage, get_my_attendance, get_my_attendance_percentage,
    get_my_attendance_summary, record_attendance, update_attendance_remarks,
};
use crate::state::AppState;

/// Mounted under `/api/faculty/attendance`.
pub fn init_faculty_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_attendance).post(record_attendance))
        .route("/percentage", get(get_attendance_percentage))
        .route("/{id}/remarks", patch(update_attendance_remarks))
}

/// Mounted under `/api/student/attendance`.
pub fn init_student_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_my_attendance))
        .route("/summary", get(get_my_attendance_summary))
        .route("/percentage", get(get_my_attendance_percentage))
}
