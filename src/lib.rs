//! # Scholaris API
//!
//! School-management REST API built with Axum and PostgreSQL: students and
//! faculty, courses and enrollment, attendance, grades, admissions, fees with
//! a mock payment gateway, transport routes and the academic calendar.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Bearer-token extractors and role gates
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Login, refresh, password change
//! │   ├── users/       # Account administration
//! │   ├── students/    # Student records and the student portal
//! │   ├── faculty/     # Faculty records
//! │   ├── courses/     # Offerings, enrollment, rosters
//! │   ├── attendance/  # Bulk recording and percentages
//! │   ├── admissions/  # Public applications and review
//! │   ├── fees/        # Fee structures, payments, summaries
//! │   ├── payments/    # Mock gateway (create / capture)
//! │   └── ...
//! └── utils/           # Caller-scoping helpers
//! ```
//!
//! Each feature module has the same shape:
//!
//! - `mod.rs`: module exports
//! - `controller.rs`: HTTP handlers with OpenAPI annotations
//! - `service.rs`: business logic and SQL
//! - `model.rs`: re-exports of the entities and DTOs from `scholaris-models`
//! - `router.rs`: Axum router configuration
//!
//! ## Access model
//!
//! | Prefix | Roles |
//! |--------|-------|
//! | `/api/admin/*` | admin |
//! | `/api/faculty/*` | faculty, admin |
//! | `/api/student/*` | student, parent |
//! | `/api/courses`, `/api/subjects`, `/api/transport`, `/api/calendar` | any signed-in user reads, admin writes |
//! | `/api/payments/*` | student, parent, admin |
//! | `/api/general/*` | public |
//!
//! A parent reaches a child's data by passing `student_id`; the child must be
//! linked to the parent's account.
//!
//! ## API documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`

pub mod docs;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

pub use scholaris_auth;
pub use scholaris_config;
pub use scholaris_core;
pub use scholaris_db;
pub use scholaris_models;
