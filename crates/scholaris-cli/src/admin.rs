use scholaris_core::hash_password;
use scholaris_models::{UserId, UserRole};
use sqlx::PgPool;

pub struct NewAdmin<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Inserts an active admin account. Fails if the email is taken.
pub async fn create_admin(db: &PgPool, admin: NewAdmin<'_>) -> anyhow::Result<UserId> {
    if admin.password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    let password_hash = hash_password(admin.password).map_err(|e| e.error)?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        r#"
        INSERT INTO users (first_name, last_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(admin.first_name)
    .bind(admin.last_name)
    .bind(admin.email.trim().to_lowercase())
    .bind(&password_hash)
    .bind(UserRole::Admin)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| anyhow::anyhow!("User with this email already exists"))
}
