use anyhow::anyhow;
use chrono::{Datelike, Utc};
use rand::Rng;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{AdmissionId, UserId};
use scholaris_observability::{track_admission_decision, track_admission_submitted};
use sqlx::types::Json;
use tracing::{info, instrument, warn};

use crate::modules::admissions::model::{
    APPLICATION_NUMBER_ATTEMPTS, Admission, AdmissionFilterParams, AdmissionStatus,
    AdmissionStatusLookup, SubmitAdmissionDto, SubmitAdmissionResponse, check_transition,
    format_application_number,
};
use crate::modules::users::service::like_pattern;

const ADMISSION_COLUMNS: &str = r#"
    id, application_number, student_info, academic_info, contact_info, parent_info, fee_info,
    status, remarks, rejection_reason, reviewed_by, reviewed_at, created_at, updated_at
"#;

const ADMISSION_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR status = $1)
      AND ($2::text IS NULL
           OR application_number ILIKE $2
           OR student_info->>'first_name' ILIKE $2
           OR student_info->>'last_name' ILIKE $2
           OR contact_info->>'email' ILIKE $2)
"#;

fn new_application_number() -> String {
    let serial = rand::thread_rng().gen_range(0..1_000_000);
    format_application_number(Utc::now().year(), serial)
}

/// What an admin review writes besides the status.
#[derive(Debug, Default)]
pub struct Review {
    pub remarks: Option<String>,
    pub rejection_reason: Option<String>,
}

pub struct AdmissionService;

impl AdmissionService {
    /// Stores a new application as `submitted`. A clashing application number
    /// is regenerated a few times before giving up.
    #[instrument(skip(db, dto))]
    pub async fn submit(
        db: &PgPool,
        dto: SubmitAdmissionDto,
    ) -> Result<SubmitAdmissionResponse, AppError> {
        for attempt in 1..=APPLICATION_NUMBER_ATTEMPTS {
            let application_number = new_application_number();

            let inserted = sqlx::query_as::<_, SubmitAdmissionResponse>(
                r#"INSERT INTO admissions (application_number, student_info, academic_info,
                                           contact_info, parent_info, fee_info)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   RETURNING id, application_number, status"#,
            )
            .bind(&application_number)
            .bind(Json(&dto.student_info))
            .bind(Json(&dto.academic_info))
            .bind(Json(&dto.contact_info))
            .bind(Json(&dto.parent_info))
            .bind(Json(&dto.fee_info))
            .fetch_one(db)
            .await;

            match inserted {
                Ok(response) => {
                    track_admission_submitted();
                    info!(application_number = %response.application_number, "Admission submitted");
                    return Ok(response);
                }
                Err(sqlx::Error::Database(db_err))
                    if db_err.constraint() == Some("admissions_application_number_key") =>
                {
                    warn!(attempt, %application_number, "Application number collision");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal(anyhow!(
            "Could not allocate an application number after {APPLICATION_NUMBER_ATTEMPTS} attempts"
        )))
    }

    #[instrument(skip(db))]
    pub async fn lookup_status(
        db: &PgPool,
        application_number: &str,
    ) -> Result<AdmissionStatusLookup, AppError> {
        sqlx::query_as::<_, AdmissionStatusLookup>(
            r#"SELECT application_number, status, created_at AS submitted_at, reviewed_at
               FROM admissions
               WHERE application_number = $1"#,
        )
        .bind(application_number.trim().to_uppercase())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Application not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_admissions(
        db: &PgPool,
        filters: AdmissionFilterParams,
    ) -> Result<Paginated<Admission>, AppError> {
        let search = like_pattern(&filters.search);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM admissions {ADMISSION_FILTER}"
        ))
        .bind(filters.status)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let sql = format!(
            r#"SELECT {ADMISSION_COLUMNS} FROM admissions {ADMISSION_FILTER}
               ORDER BY created_at DESC
               LIMIT $3 OFFSET $4"#
        );
        let admissions = sqlx::query_as::<_, Admission>(&sql)
            .bind(filters.status)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(admissions, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_admission(db: &PgPool, id: AdmissionId) -> Result<Admission, AppError> {
        sqlx::query_as::<_, Admission>(&format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Application not found")))
    }

    /// Moves an application to `target`. The update only matches rows still in
    /// an allowed source status, so of two concurrent decisions one gets 409.
    #[instrument(skip(db, review))]
    pub async fn transition(
        db: &PgPool,
        id: AdmissionId,
        target: AdmissionStatus,
        reviewer: UserId,
        review: Review,
    ) -> Result<Admission, AppError> {
        let current = Self::get_admission(db, id).await?;
        check_transition(current.status, target).map_err(AppError::conflict)?;

        let allowed: Vec<AdmissionStatus> = AdmissionStatus::allowed_sources(target).to_vec();
        let sql = format!(
            r#"UPDATE admissions SET
                   status = $2,
                   remarks = COALESCE($3, remarks),
                   rejection_reason = COALESCE($4, rejection_reason),
                   reviewed_by = $5,
                   reviewed_at = NOW(),
                   updated_at = NOW()
               WHERE id = $1 AND status = ANY($6)
               RETURNING {ADMISSION_COLUMNS}"#
        );

        let updated = sqlx::query_as::<_, Admission>(&sql)
            .bind(id)
            .bind(target)
            .bind(&review.remarks)
            .bind(&review.rejection_reason)
            .bind(reviewer)
            .bind(&allowed)
            .fetch_optional(db)
            .await?;

        match updated {
            Some(admission) => {
                track_admission_decision(target.as_str());
                info!(
                    application_number = %admission.application_number,
                    from = %current.status,
                    to = %target,
                    "Admission status changed"
                );
                Ok(admission)
            }
            None => {
                let latest = Self::get_admission(db, id).await?;
                Err(AppError::conflict(anyhow!(
                    "Application status changed to {} while this request was processed",
                    latest.status
                )))
            }
        }
    }

    pub async fn approve(
        db: &PgPool,
        id: AdmissionId,
        reviewer: UserId,
        remarks: Option<String>,
    ) -> Result<Admission, AppError> {
        let review = Review {
            remarks,
            rejection_reason: None,
        };
        Self::transition(db, id, AdmissionStatus::Approved, reviewer, review).await
    }

    pub async fn reject(
        db: &PgPool,
        id: AdmissionId,
        reviewer: UserId,
        reason: String,
        remarks: Option<String>,
    ) -> Result<Admission, AppError> {
        let review = Review {
            remarks,
            rejection_reason: Some(reason),
        };
        Self::transition(db, id, AdmissionStatus::Rejected, reviewer, review).await
    }

    /// For the statuses that are not a decision: under review, waitlisted and admitted.
    pub async fn update_status(
        db: &PgPool,
        id: AdmissionId,
        reviewer: UserId,
        status: AdmissionStatus,
        remarks: Option<String>,
    ) -> Result<Admission, AppError> {
        if matches!(status, AdmissionStatus::Approved | AdmissionStatus::Rejected) {
            return Err(AppError::bad_request(anyhow!(
                "Use the approve or reject endpoint to decide an application"
            )));
        }

        let review = Review {
            remarks,
            rejection_reason: None,
        };
        Self::transition(db, id, status, reviewer, review).await
    }
}
