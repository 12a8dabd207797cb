pub use scholaris_models::dashboard::{AdmissionBreakdown, DashboardStats, StatusCount};
