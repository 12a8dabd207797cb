use scholaris_core::AppError;
use scholaris_db::PgPool;
use scholaris_models::admissions::AdmissionStatus;
use tracing::instrument;

use crate::modules::dashboard::model::{AdmissionBreakdown, DashboardStats, StatusCount};

pub struct DashboardService;

impl DashboardService {
    /// One round trip. Pending admissions are those not yet decided.
    #[instrument(skip(db))]
    pub async fn get_stats(db: &PgPool) -> Result<DashboardStats, AppError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"SELECT
                   (SELECT COUNT(*) FROM students) AS total_students,
                   (SELECT COUNT(*) FROM faculty) AS total_faculty,
                   (SELECT COUNT(*) FROM courses) AS total_courses,
                   (SELECT COUNT(*) FROM admissions
                     WHERE status = ANY($1)) AS pending_admissions,
                   (SELECT COUNT(*) FROM attendance WHERE date = CURRENT_DATE) AS attendance_today,
                   (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM fee_payments
                     WHERE status = 'paid') AS fees_collected"#,
        )
        .bind(AdmissionStatus::UNDECIDED.to_vec())
        .fetch_one(db)
        .await?;

        Ok(stats)
    }

    #[instrument(skip(db))]
    pub async fn get_admission_breakdown(db: &PgPool) -> Result<AdmissionBreakdown, AppError> {
        let by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM admissions GROUP BY status ORDER BY status",
        )
        .fetch_all(db)
        .await?;

        Ok(AdmissionBreakdown { by_status })
    }
}
