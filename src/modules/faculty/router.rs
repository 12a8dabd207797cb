use axum::{Router, routing::get};

use crate::modules::faculty::controller::{
    create_faculty, delete_faculty, get_faculty, get_faculty_list, get_my_faculty_profile,
    update_faculty,
};
use crate::state::AppState;

pub fn init_faculty_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_faculty_list).post(create_faculty))
        .route(
            "/{id}",
            get(get_faculty).put(update_faculty).delete(delete_faculty),
        )
}

pub fn init_faculty_profile_router() -> Router<AppState> {
    Router::new().route("/profile", get(get_my_faculty_profile))
}
