use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::modules::courses::controller::{
    create_course, delete_course, enroll_student, get_course, get_course_students, get_courses,
    get_my_courses, get_student_courses, unenroll_student, update_course,
};
use crate::state::AppState;

/// Catalogue reads for any signed-in user; writes and enrollment for admins.
pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_courses).post(create_course))
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/{id}/students", get(get_course_students))
        .route("/{id}/enroll", post(enroll_student))
        .route("/{id}/enroll/{student_id}", delete(unenroll_student))
}

/// Mounted under `/api/faculty/courses`.
pub fn init_faculty_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_my_courses))
        .route("/{id}/students", get(get_course_students))
}

/// Mounted under `/api/student/courses`.
pub fn init_student_courses_router() -> Router<AppState> {
    Router::new().route("/", get(get_student_courses))
}
