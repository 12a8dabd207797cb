use axum::{Router, routing::get};

use crate::modules::subjects::controller::{
    create_subject, delete_subject, get_subject, get_subjects, update_subject,
};
use crate::state::AppState;

pub fn init_subjects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_subjects).post(create_subject))
        .route(
            "/{id}",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
}
