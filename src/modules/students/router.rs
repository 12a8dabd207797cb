use axum::{Router, routing::get};

use crate::modules::students::controller::{
    create_student, delete_student, get_my_children, get_my_profile, get_student, get_students,
    update_student,
};
use crate::state::AppState;

/// Admin CRUD, mounted under `/api/admin/students`.
pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students).post(create_student))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

/// Self-service routes for students and parents, mounted under `/api/student`.
pub fn init_student_portal_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_my_profile))
        .route("/children", get(get_my_children))
}
