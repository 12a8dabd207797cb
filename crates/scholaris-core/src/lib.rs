//! # Scholaris Core
//!
//! Core types, errors, and utilities shared by every Scholaris crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`response`]: The `{success, message, data}` response envelope
//! - [`pagination`]: Pagination parameters and metadata
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Custom serde deserialization helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use scholaris_core::{AppError, ApiResponse};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Course not found"));
//! let ok = ApiResponse::new("Course retrieved", course);
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod response;
pub mod serde;

pub use errors::{AppError, ErrorResponse, FieldError};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, MessageResponse, Paginated};
