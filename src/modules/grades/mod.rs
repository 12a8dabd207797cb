pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_faculty_grades_router, init_student_grades_router};
