pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_courses_router, init_faculty_courses_router, init_student_courses_router};
