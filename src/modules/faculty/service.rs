use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{FacultyId, UserId, UserRole};
use tracing::instrument;

use crate::modules::faculty::model::{
    CreateFacultyDto, Faculty, FacultyFilterParams, UpdateFacultyDto,
};
use crate::modules::users::service::{NewAccount, UserService, like_pattern};

const FACULTY_SELECT: &str = r#"
    SELECT f.id, f.user_id, f.employee_number, u.first_name, u.last_name, u.email,
           f.department, f.designation, f.qualification, f.phone, f.joining_date,
           u.is_active, f.created_at, f.updated_at
    FROM faculty f
    JOIN users u ON u.id = f.user_id
"#;

const FACULTY_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR f.department = $1)
      AND ($2::text IS NULL
           OR u.first_name ILIKE $2
           OR u.last_name ILIKE $2
           OR u.email ILIKE $2
           OR f.employee_number ILIKE $2)
"#;

pub struct FacultyService;

impl FacultyService {
    #[instrument(skip(db, dto), fields(employee_number = %dto.employee_number))]
    pub async fn create_faculty(db: &PgPool, dto: CreateFacultyDto) -> Result<Faculty, AppError> {
        let mut tx = db.begin().await?;

        let user = UserService::insert_account(
            &mut tx,
            NewAccount {
                email: &dto.email,
                password: &dto.password,
                first_name: &dto.first_name,
                last_name: &dto.last_name,
                role: UserRole::Faculty,
                phone: dto.phone.as_deref(),
            },
        )
        .await?;

        let id = sqlx::query_scalar::<_, FacultyId>(
            r#"INSERT INTO faculty (user_id, employee_number, department, designation,
                                    qualification, phone, joining_date)
               VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, CURRENT_DATE))
               RETURNING id"#,
        )
        .bind(user.id)
        .bind(dto.employee_number.trim())
        .bind(&dto.department)
        .bind(&dto.designation)
        .bind(&dto.qualification)
        .bind(&dto.phone)
        .bind(dto.joining_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.constraint() == Some("faculty_employee_number_key")
            {
                return AppError::conflict(anyhow!("Employee number already exists"));
            }
            AppError::from(e)
        })?;

        tx.commit().await?;
        Self::get_faculty(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_faculty_list(
        db: &PgPool,
        filters: FacultyFilterParams,
    ) -> Result<Paginated<Faculty>, AppError> {
        let search = like_pattern(&filters.search);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM faculty f JOIN users u ON u.id = f.user_id {FACULTY_FILTER}"
        ))
        .bind(&filters.department)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let sql = format!(
            "{FACULTY_SELECT} {FACULTY_FILTER} ORDER BY u.last_name, u.first_name LIMIT $3 OFFSET $4"
        );
        let faculty = sqlx::query_as::<_, Faculty>(&sql)
            .bind(&filters.department)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(faculty, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_faculty(db: &PgPool, id: FacultyId) -> Result<Faculty, AppError> {
        sqlx::query_as::<_, Faculty>(&format!("{FACULTY_SELECT} WHERE f.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Faculty member not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_by_user(db: &PgPool, user_id: UserId) -> Result<Faculty, AppError> {
        sqlx::query_as::<_, Faculty>(&format!("{FACULTY_SELECT} WHERE f.user_id = $1"))
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Faculty profile not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_faculty(
        db: &PgPool,
        id: FacultyId,
        dto: UpdateFacultyDto,
    ) -> Result<Faculty, AppError> {
        let mut tx = db.begin().await?;

        let user_id = sqlx::query_scalar::<_, UserId>(
            r#"UPDATE faculty SET
                   department = COALESCE($2, department),
                   designation = COALESCE($3, designation),
                   qualification = COALESCE($4, qualification),
                   phone = COALESCE($5, phone),
                   joining_date = COALESCE($6, joining_date),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING user_id"#,
        )
        .bind(id)
        .bind(&dto.department)
        .bind(&dto.designation)
        .bind(&dto.qualification)
        .bind(&dto.phone)
        .bind(dto.joining_date)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Faculty member not found")))?;

        sqlx::query(
            r#"UPDATE users SET
                   first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   is_active = COALESCE($4, is_active),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(user_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(dto.is_active)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::get_faculty(db, id).await
    }

    /// Courses they taught keep existing with no instructor. Accounts that
    /// recorded attendance cannot be deleted and should be deactivated instead.
    #[instrument(skip(db))]
    pub async fn delete_faculty(db: &PgPool, id: FacultyId) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM users WHERE id = (SELECT user_id FROM faculty WHERE id = $1)")
                .bind(id)
                .execute(db)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(db_err) = &e
                        && db_err.is_foreign_key_violation()
                    {
                        return AppError::conflict(anyhow!(
                            "Faculty member has recorded attendance; deactivate the account instead"
                        ));
                    }
                    AppError::from(e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Faculty member not found")));
        }

        Ok(())
    }
}
