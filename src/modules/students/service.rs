use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{StudentId, UserId, UserRole};
use sqlx::PgConnection;
use tracing::instrument;

use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, UpdateStudentDto,
};
use crate::modules::users::service::{NewAccount, UserService, like_pattern};

/// Selects [`Student`] rows; the name, email and active flag live on `users`.
pub const STUDENT_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.student_number, u.first_name, u.last_name, u.email,
           s.date_of_birth, s.gender, s.grade_level, s.section, s.parent_user_id,
           s.phone, s.address, s.admission_date, s.transport_route_id, u.is_active,
           s.created_at, s.updated_at
    FROM students s
    JOIN users u ON u.id = s.user_id
"#;

const STUDENT_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR s.grade_level = $1)
      AND ($2::text IS NULL OR s.section = $2)
      AND ($3::text IS NULL
           OR u.first_name ILIKE $3
           OR u.last_name ILIKE $3
           OR u.email ILIKE $3
           OR s.student_number ILIKE $3)
"#;

fn map_profile_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.constraint() == Some("students_student_number_key")
    {
        return AppError::conflict(anyhow!("Student number already exists"));
    }
    AppError::from(e)
}

async fn ensure_parent_account(conn: &mut PgConnection, user_id: UserId) -> Result<(), AppError> {
    let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    match role {
        Some(UserRole::Parent) => Ok(()),
        Some(_) => Err(AppError::bad_request(anyhow!(
            "parent_user_id must reference a parent account"
        ))),
        None => Err(AppError::bad_request(anyhow!("Parent account not found"))),
    }
}

pub struct StudentService;

impl StudentService {
    /// Creates the login account and the student profile in one transaction.
    #[instrument(skip(db, dto), fields(student_number = %dto.student_number))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let mut tx = db.begin().await?;

        if let Some(parent_id) = dto.parent_user_id {
            ensure_parent_account(&mut tx, parent_id).await?;
        }

        let user = UserService::insert_account(
            &mut tx,
            NewAccount {
                email: &dto.email,
                password: &dto.password,
                first_name: &dto.first_name,
                last_name: &dto.last_name,
                role: UserRole::Student,
                phone: dto.phone.as_deref(),
            },
        )
        .await?;

        let id = sqlx::query_scalar::<_, StudentId>(
            r#"INSERT INTO students (user_id, student_number, date_of_birth, gender, grade_level,
                                     section, parent_user_id, phone, address, admission_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, CURRENT_DATE))
               RETURNING id"#,
        )
        .bind(user.id)
        .bind(dto.student_number.trim())
        .bind(dto.date_of_birth)
        .bind(&dto.gender)
        .bind(dto.grade_level.trim())
        .bind(&dto.section)
        .bind(dto.parent_user_id)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(dto.admission_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_profile_error)?;

        tx.commit().await?;

        tracing::info!(student_id = %id.into_inner(), "Student created");
        Self::get_student(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<Paginated<Student>, AppError> {
        let search = like_pattern(&filters.search);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM students s JOIN users u ON u.id = s.user_id {STUDENT_FILTER}"
        ))
        .bind(&filters.grade_level)
        .bind(&filters.section)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let sql = format!(
            "{STUDENT_SELECT} {STUDENT_FILTER} ORDER BY u.last_name, u.first_name LIMIT $4 OFFSET $5"
        );
        let students = sqlx::query_as::<_, Student>(&sql)
            .bind(&filters.grade_level)
            .bind(&filters.section)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(students, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_children(db: &PgPool, parent_id: UserId) -> Result<Vec<Student>, AppError> {
        let sql = format!("{STUDENT_SELECT} WHERE s.parent_user_id = $1 ORDER BY u.first_name");
        Ok(sqlx::query_as::<_, Student>(&sql)
            .bind(parent_id)
            .fetch_all(db)
            .await?)
    }

    /// Partial update across the account and the profile.
    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut tx = db.begin().await?;

        if let Some(parent_id) = dto.parent_user_id {
            ensure_parent_account(&mut tx, parent_id).await?;
        }

        let user_id = sqlx::query_scalar::<_, UserId>(
            r#"UPDATE students SET
                   date_of_birth = COALESCE($2, date_of_birth),
                   gender = COALESCE($3, gender),
                   grade_level = COALESCE($4, grade_level),
                   section = COALESCE($5, section),
                   parent_user_id = COALESCE($6, parent_user_id),
                   phone = COALESCE($7, phone),
                   address = COALESCE($8, address),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING user_id"#,
        )
        .bind(id)
        .bind(dto.date_of_birth)
        .bind(&dto.gender)
        .bind(&dto.grade_level)
        .bind(&dto.section)
        .bind(dto.parent_user_id)
        .bind(&dto.phone)
        .bind(&dto.address)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

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
        Self::get_student(db, id).await
    }

    /// Deletes the account; the profile and its records cascade.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: StudentId) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM users WHERE id = (SELECT user_id FROM students WHERE id = $1)")
                .bind(id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        Ok(())
    }
}
