use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::SubjectId;
use tracing::instrument;

use crate::modules::subjects::model::{
    CreateSubjectDto, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use crate::modules::users::service::like_pattern;

const SUBJECT_COLUMNS: &str = "id, code, name, description, credits, department, created_at, updated_at";

const SUBJECT_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR department = $1)
      AND ($2::text IS NULL OR code ILIKE $2 OR name ILIKE $2)
"#;

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        let sql = format!(
            r#"INSERT INTO subjects (code, name, description, credits, department)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {SUBJECT_COLUMNS}"#
        );

        sqlx::query_as::<_, Subject>(&sql)
            .bind(dto.code.trim().to_uppercase())
            .bind(dto.name.trim())
            .bind(&dto.description)
            .bind(dto.credits)
            .bind(&dto.department)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::conflict(anyhow!("A subject with this code already exists"));
                }
                AppError::from(e)
            })
    }

    #[instrument(skip(db))]
    pub async fn get_subjects(
        db: &PgPool,
        filters: SubjectFilterParams,
    ) -> Result<Paginated<Subject>, AppError> {
        let search = like_pattern(&filters.search);

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM subjects {SUBJECT_FILTER}"))
                .bind(&filters.department)
                .bind(&search)
                .fetch_one(db)
                .await?;

        let sql = format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects {SUBJECT_FILTER} ORDER BY code LIMIT $3 OFFSET $4"
        );
        let subjects = sqlx::query_as::<_, Subject>(&sql)
            .bind(&filters.department)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(subjects, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_subject(db: &PgPool, id: SubjectId) -> Result<Subject, AppError> {
        sqlx::query_as::<_, Subject>(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_subject(
        db: &PgPool,
        id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let sql = format!(
            r#"UPDATE subjects SET
                   name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   credits = COALESCE($4, credits),
                   department = COALESCE($5, department),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {SUBJECT_COLUMNS}"#
        );

        sqlx::query_as::<_, Subject>(&sql)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(dto.credits)
            .bind(&dto.department)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Subject not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_subject(db: &PgPool, id: SubjectId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow!(
                        "Subject still has courses and cannot be deleted"
                    ));
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Subject not found")));
        }

        Ok(())
    }
}
