use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::modules::transport::controller::{
    assign_student, create_route, delete_route, get_route, get_routes, unassign_student,
    update_route,
};
use crate::state::AppState;

pub fn init_transport_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_routes).post(create_route))
        .route("/{id}", get(get_route).put(update_route).delete(delete_route))
        .route("/{id}/assign", post(assign_student))
        .route("/{id}/assign/{student_id}", delete(unassign_student))
}
