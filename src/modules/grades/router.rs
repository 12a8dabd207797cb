use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::grades::controller::{create_grade, get_grades, get_my_grades, update_grade};
use crate::state::AppState;

/// Mounted under `/api/faculty/grades`.
pub fn init_faculty_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grades).post(create_grade))
        .route("/{id}", put(update_grade))
}

/// Mounted under `/api/student/grades`.
pub fn init_student_grades_router() -> Router<AppState> {
    Router::new().route("/", get(get_my_grades))
}
