//! # Scholaris Models
//!
//! Database entities, request/response DTOs, and the domain rules that do not
//! need a database: attendance percentages, admission status transitions,
//! enrollment capacity checks, and letter grades.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed UUID newtypes
//! - [`academic`]: Academic year and session types shared by many records
//! - [`users`], [`students`], [`faculty`]: people and their profiles
//! - [`subjects`], [`courses`]: the catalogue and enrollment
//! - [`attendance`], [`grades`]: classroom records
//! - [`admissions`]: public applications and their review lifecycle
//! - [`fees`], [`payments`]: fee structures, payments, and the mock gateway
//! - [`calendar`], [`transport`]: events and bus routes
//! - [`auth`], [`dashboard`]: login payloads and admin statistics

#[macro_use]
mod text_enum;

pub mod academic;
pub mod admissions;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod courses;
pub mod dashboard;
pub mod faculty;
pub mod fees;
pub mod grades;
pub mod ids;
pub mod payments;
pub mod students;
pub mod subjects;
pub mod transport;
pub mod users;

pub use academic::Session;
pub use ids::*;
pub use text_enum::UnknownVariant;
pub use users::UserRole;
