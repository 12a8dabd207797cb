use anyhow::anyhow;
use scholaris_core::{AppError, Paginated, hash_password};
use scholaris_models::UserId;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use crate::modules::users::model::{CreateUserDto, User, UserFilterParams, UserRole};

/// Columns of [`User`], in struct order.
pub const USER_COLUMNS: &str =
    "id, email, first_name, last_name, role, phone, is_active, last_login_at, created_at, updated_at";

const USER_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR role = $1)
      AND ($2::text IS NULL
           OR first_name ILIKE $2
           OR last_name ILIKE $2
           OR email ILIKE $2)
"#;

/// Account fields shared by every way of creating a user.
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: UserRole,
    pub phone: Option<&'a str>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn like_pattern(search: &Option<String>) -> Option<String> {
    search.as_ref().map(|s| format!("%{}%", s))
}

pub struct UserService;

impl UserService {
    /// Inserts a `users` row on an existing connection so callers can wrap it
    /// in a transaction with a profile insert.
    #[instrument(skip(conn, account), fields(email = %account.email, role = %account.role))]
    pub async fn insert_account(
        conn: &mut PgConnection,
        account: NewAccount<'_>,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(account.password)?;

        let sql = format!(
            r#"INSERT INTO users (email, password_hash, first_name, last_name, role, phone)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {USER_COLUMNS}"#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(normalize_email(account.email))
            .bind(&password_hash)
            .bind(account.first_name.trim())
            .bind(account.last_name.trim())
            .bind(account.role)
            .bind(account.phone)
            .fetch_one(conn)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.constraint() == Some("users_email_key")
                {
                    return AppError::conflict(anyhow!("A user with this email already exists"));
                }
                AppError::from(e)
            })
    }

    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let mut conn = db.acquire().await?;
        Self::insert_account(
            &mut conn,
            NewAccount {
                email: &dto.email,
                password: &dto.password,
                first_name: &dto.first_name,
                last_name: &dto.last_name,
                role: dto.role,
                phone: dto.phone.as_deref(),
            },
        )
        .await
    }

    #[instrument(skip(db))]
    pub async fn get_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<Paginated<User>, AppError> {
        let role = filters.role.map(|r| r.as_str());
        let search = like_pattern(&filters.search);

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users {USER_FILTER}"))
            .bind(role)
            .bind(&search)
            .fetch_one(db)
            .await?;

        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users {USER_FILTER} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(users, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(db))]
    pub async fn set_active(db: &PgPool, id: UserId, is_active: bool) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(is_active)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Registrar@School.EDU "), "registrar@school.edu");
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern(&Some("oka".to_string())).as_deref(), Some("%oka%"));
        assert_eq!(like_pattern(&None), None);
    }
}
