use anyhow::anyhow;
use chrono::{DateTime, Utc};
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{FeeStructureId, StudentId, UserId};
use sqlx::PgConnection;
use tracing::{info, instrument};

use crate::modules::fees::model::{
    CreateFeeStructureDto, FeePayment, FeePaymentFilterParams, FeePaymentStatus, FeeStructure,
    FeeStructureFilterParams, FeeSummaryLine, PaymentMethod, RecordPaymentDto, StudentFeeSummary,
    UpdateFeeStructureDto,
};

const FEE_STRUCTURE_COLUMNS: &str = "id, name, fee_type, grade_level, academic_year, amount, due_date, description, created_at, updated_at";

const FEE_PAYMENT_COLUMNS: &str = "id, student_id, fee_structure_id, amount, method, status, transaction_ref, paid_at, recorded_by, created_at";

const FEE_STRUCTURE_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR grade_level = $1)
      AND ($2::text IS NULL OR academic_year = $2)
      AND ($3::text IS NULL OR fee_type = $3)
"#;

const FEE_PAYMENT_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR student_id = $1)
      AND ($2::uuid IS NULL OR fee_structure_id = $2)
      AND ($3::text IS NULL OR status = $3)
"#;

fn map_structure_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.constraint() == Some("fee_structures_name_grade_year_key")
    {
        return AppError::conflict(anyhow!(
            "A fee with this name already exists for the grade and academic year"
        ));
    }
    AppError::from(e)
}

/// A payment to insert, from the office or from a captured intent.
pub struct NewPayment<'a> {
    pub student_id: StudentId,
    pub fee_structure_id: FeeStructureId,
    pub amount: i64,
    pub method: PaymentMethod,
    pub transaction_ref: Option<&'a str>,
    /// Defaults to now
    pub paid_at: Option<DateTime<Utc>>,
    pub recorded_by: UserId,
}

pub struct FeeService;

impl FeeService {
    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_structure(
        db: &PgPool,
        dto: CreateFeeStructureDto,
    ) -> Result<FeeStructure, AppError> {
        let sql = format!(
            r#"INSERT INTO fee_structures (name, fee_type, grade_level, academic_year, amount,
                                           due_date, description)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {FEE_STRUCTURE_COLUMNS}"#
        );

        sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(dto.name.trim())
            .bind(dto.fee_type)
            .bind(dto.grade_level.trim())
            .bind(&dto.academic_year)
            .bind(dto.amount)
            .bind(dto.due_date)
            .bind(&dto.description)
            .fetch_one(db)
            .await
            .map_err(map_structure_write_error)
    }

    #[instrument(skip(db))]
    pub async fn get_structures(
        db: &PgPool,
        filters: FeeStructureFilterParams,
    ) -> Result<Paginated<FeeStructure>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM fee_structures {FEE_STRUCTURE_FILTER}"
        ))
        .bind(&filters.grade_level)
        .bind(&filters.academic_year)
        .bind(filters.fee_type)
        .fetch_one(db)
        .await?;

        let sql = format!(
            r#"SELECT {FEE_STRUCTURE_COLUMNS} FROM fee_structures {FEE_STRUCTURE_FILTER}
               ORDER BY academic_year DESC, grade_level, name
               LIMIT $4 OFFSET $5"#
        );
        let structures = sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(&filters.grade_level)
            .bind(&filters.academic_year)
            .bind(filters.fee_type)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(structures, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_structure(db: &PgPool, id: FeeStructureId) -> Result<FeeStructure, AppError> {
        sqlx::query_as::<_, FeeStructure>(&format!(
            "SELECT {FEE_STRUCTURE_COLUMNS} FROM fee_structures WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Fee structure not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_structure(
        db: &PgPool,
        id: FeeStructureId,
        dto: UpdateFeeStructureDto,
    ) -> Result<FeeStructure, AppError> {
        let sql = format!(
            r#"UPDATE fee_structures SET
                   name = COALESCE($2, name),
                   fee_type = COALESCE($3, fee_type),
                   amount = COALESCE($4, amount),
                   due_date = COALESCE($5, due_date),
                   description = COALESCE($6, description),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {FEE_STRUCTURE_COLUMNS}"#
        );

        sqlx::query_as::<_, FeeStructure>(&sql)
            .bind(id)
            .bind(&dto.name)
            .bind(dto.fee_type)
            .bind(dto.amount)
            .bind(dto.due_date)
            .bind(&dto.description)
            .fetch_optional(db)
            .await
            .map_err(map_structure_write_error)?
            .ok_or_else(|| AppError::not_found(anyhow!("Fee structure not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_structure(db: &PgPool, id: FeeStructureId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM fee_structures WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow!(
                        "Payments have been recorded against this fee structure"
                    ));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Fee structure not found")));
        }

        Ok(())
    }

    /// Inserts a paid payment. Shared by the office form and intent capture.
    pub async fn insert_payment(
        conn: &mut PgConnection,
        payment: NewPayment<'_>,
    ) -> Result<FeePayment, AppError> {
        let sql = format!(
            r#"INSERT INTO fee_payments (student_id, fee_structure_id, amount, method, status,
                                         transaction_ref, paid_at, recorded_by)
               VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8)
               RETURNING {FEE_PAYMENT_COLUMNS}"#
        );

        sqlx::query_as::<_, FeePayment>(&sql)
            .bind(payment.student_id)
            .bind(payment.fee_structure_id)
            .bind(payment.amount)
            .bind(payment.method)
            .bind(FeePaymentStatus::Paid)
            .bind(payment.transaction_ref)
            .bind(payment.paid_at)
            .bind(payment.recorded_by)
            .fetch_one(conn)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::not_found(anyhow!("Student or fee structure not found"));
                }
                AppError::from(e)
            })
    }

    #[instrument(skip(db, dto), fields(student_id = %dto.student_id, amount = dto.amount))]
    pub async fn record_payment(
        db: &PgPool,
        recorded_by: UserId,
        dto: RecordPaymentDto,
    ) -> Result<FeePayment, AppError> {
        let mut conn = db.acquire().await?;
        let payment = Self::insert_payment(
            &mut conn,
            NewPayment {
                student_id: dto.student_id,
                fee_structure_id: dto.fee_structure_id,
                amount: dto.amount,
                method: dto.method,
                transaction_ref: dto.transaction_ref.as_deref(),
                paid_at: dto.paid_at,
                recorded_by,
            },
        )
        .await?;

        info!(payment_id = %payment.id, "Fee payment recorded");
        Ok(payment)
    }

    #[instrument(skip(db))]
    pub async fn get_payments(
        db: &PgPool,
        filters: FeePaymentFilterParams,
    ) -> Result<Paginated<FeePayment>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM fee_payments {FEE_PAYMENT_FILTER}"
        ))
        .bind(filters.student_id)
        .bind(filters.fee_structure_id)
        .bind(filters.status)
        .fetch_one(db)
        .await?;

        let sql = format!(
            r#"SELECT {FEE_PAYMENT_COLUMNS} FROM fee_payments {FEE_PAYMENT_FILTER}
               ORDER BY created_at DESC
               LIMIT $4 OFFSET $5"#
        );
        let payments = sqlx::query_as::<_, FeePayment>(&sql)
            .bind(filters.student_id)
            .bind(filters.fee_structure_id)
            .bind(filters.status)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(payments, total, &filters.pagination))
    }

    /// Amount still owed on one fee structure. Never negative.
    pub async fn outstanding(
        db: &PgPool,
        student_id: StudentId,
        fee_structure_id: FeeStructureId,
    ) -> Result<i64, AppError> {
        let structure = Self::get_structure(db, fee_structure_id).await?;
        let paid = sqlx::query_scalar::<_, i64>(
            r#"SELECT COALESCE(SUM(amount), 0)::BIGINT
               FROM fee_payments
               WHERE student_id = $1 AND fee_structure_id = $2 AND status = 'paid'"#,
        )
        .bind(student_id)
        .bind(fee_structure_id)
        .fetch_one(db)
        .await?;

        Ok((structure.amount - paid).max(0))
    }

    /// Fees for the student's grade level, plus any other fee they have paid towards.
    #[instrument(skip(db))]
    pub async fn get_summary(
        db: &PgPool,
        student_id: StudentId,
        academic_year: Option<String>,
    ) -> Result<StudentFeeSummary, AppError> {
        let grade_level =
            sqlx::query_scalar::<_, String>("SELECT grade_level FROM students WHERE id = $1")
                .bind(student_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let lines = sqlx::query_as::<_, FeeSummaryLine>(
            r#"SELECT fs.id AS fee_structure_id, fs.name, fs.fee_type, fs.amount,
                      COALESCE((SELECT SUM(p.amount)
                                FROM fee_payments p
                                WHERE p.fee_structure_id = fs.id
                                  AND p.student_id = $1
                                  AND p.status = 'paid'), 0)::BIGINT AS paid,
                      fs.due_date
               FROM fee_structures fs
               WHERE (fs.grade_level = $2
                      OR EXISTS (SELECT 1 FROM fee_payments p
                                 WHERE p.fee_structure_id = fs.id AND p.student_id = $1))
                 AND ($3::text IS NULL OR fs.academic_year = $3)
               ORDER BY fs.due_date NULLS LAST, fs.name"#,
        )
        .bind(student_id)
        .bind(&grade_level)
        .bind(&academic_year)
        .fetch_all(db)
        .await?;

        Ok(StudentFeeSummary::from_lines(student_id, academic_year, lines))
    }
}
