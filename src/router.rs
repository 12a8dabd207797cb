use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use scholaris_observability::{logging_middleware, metrics_middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::middleware::role::{
    require_admin, require_faculty, require_payer, require_student_or_parent,
};
use crate::modules::admissions::init_admissions_router;
use crate::modules::attendance::{init_faculty_attendance_router, init_student_attendance_router};
use crate::modules::auth::init_auth_router;
use crate::modules::calendar::init_calendar_router;
use crate::modules::courses::{
    init_courses_router, init_faculty_courses_router, init_student_courses_router,
};
use crate::modules::dashboard::init_dashboard_router;
use crate::modules::faculty::{init_faculty_profile_router, init_faculty_router};
use crate::modules::fees::{init_fees_router, init_student_fees_router};
use crate::modules::general::init_general_router;
use crate::modules::grades::{init_faculty_grades_router, init_student_grades_router};
use crate::modules::payments::init_payments_router;
use crate::modules::students::{init_student_portal_router, init_students_router};
use crate::modules::subjects::init_subjects_router;
use crate::modules::transport::init_transport_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;

/// `/api/admin/*`: administrators only.
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", init_users_router())
        .nest("/students", init_students_router())
        .nest("/faculty", init_faculty_router())
        .nest("/admissions", init_admissions_router())
        .nest("/fees", init_fees_router())
        .nest("/dashboard", init_dashboard_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

/// `/api/faculty/*`: faculty members, and administrators acting for them.
fn faculty_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(init_faculty_profile_router())
        .nest("/courses", init_faculty_courses_router())
        .nest("/attendance", init_faculty_attendance_router())
        .nest("/grades", init_faculty_grades_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_faculty))
}

/// `/api/student/*`: a student for themselves, or a parent for a child.
fn student_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(init_student_portal_router())
        .nest("/courses", init_student_courses_router())
        .nest("/attendance", init_student_attendance_router())
        .nest("/grades", init_student_grades_router())
        .nest("/fees", init_student_fees_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_student_or_parent,
        ))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router(&state.rate_limit_config))
                .nest("/admin", admin_routes(&state))
                .nest("/faculty", faculty_routes(&state))
                .nest("/student", student_routes(&state))
                .nest("/courses", init_courses_router())
                .nest("/subjects", init_subjects_router())
                .nest("/transport", init_transport_router())
                .nest("/calendar", init_calendar_router())
                .nest(
                    "/payments",
                    init_payments_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_payer)),
                )
                .nest("/general", init_general_router()),
        )
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
}
