pub mod admissions;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod courses;
pub mod dashboard;
pub mod faculty;
pub mod fees;
pub mod general;
pub mod grades;
pub mod payments;
pub mod students;
pub mod subjects;
pub mod transport;
pub mod users;
