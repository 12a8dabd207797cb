//! Public endpoints: liveness plus the admission form and its status lookup.

pub mod controller;
pub mod model;
pub mod router;

pub use router::init_general_router;
