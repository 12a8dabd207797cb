use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_faculty: i64,
    pub total_courses: i64,
    pub pending_admissions: i64,
    pub attendance_today: i64,
    /// Sum of paid fee payments, minor units
    pub fees_collected: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdmissionBreakdown {
    pub by_status: Vec<StatusCount>,
}
