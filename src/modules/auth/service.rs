use anyhow::anyhow;
use scholaris_auth::{create_access_token, create_refresh_token, verify_refresh_token};
use scholaris_config::JwtConfig;
use scholaris_core::{AppError, hash_password, verify_password};
use scholaris_db::PgPool;
use scholaris_models::UserId;
use scholaris_models::users::User;
use scholaris_observability::{track_login_failure, track_login_success};
use tracing::instrument;

use crate::modules::auth::model::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
};
use crate::modules::users::service::{USER_COLUMNS, UserService, normalize_email};

#[derive(sqlx::FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

pub struct AuthService;

impl AuthService {
    fn issue_tokens(user: User, jwt_config: &JwtConfig) -> Result<LoginResponse, AppError> {
        let access_token =
            create_access_token(user.id.into_inner(), &user.email, user.role.as_str(), jwt_config)?;
        let refresh_token = create_refresh_token(user.id.into_inner(), &user.email, jwt_config)?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let Some(found) = sqlx::query_as::<_, UserWithPassword>(&sql)
            .bind(normalize_email(&dto.email))
            .fetch_optional(db)
            .await?
        else {
            track_login_failure("unknown_email");
            return Err(AppError::unauthorized(anyhow!("Invalid email or password")));
        };

        if !verify_password(&dto.password, &found.password_hash)? {
            track_login_failure("wrong_password");
            return Err(AppError::unauthorized(anyhow!("Invalid email or password")));
        }

        if !found.user.is_active {
            track_login_failure("inactive");
            return Err(AppError::forbidden(anyhow!("This account has been deactivated")));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(found.user.id)
        .fetch_one(db)
        .await?;

        track_login_success(user.role.as_str());
        tracing::info!(user_id = %user.id.into_inner(), role = %user.role, "User logged in");

        Self::issue_tokens(user, jwt_config)
    }

    /// Exchanges a refresh token for a fresh token pair. The account must still
    /// exist and be active.
    #[instrument(skip_all)]
    pub async fn refresh(
        db: &PgPool,
        dto: RefreshTokenRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let claims = verify_refresh_token(&dto.refresh_token, jwt_config)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map(UserId::from_uuid)
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid refresh token")))?;

        let user = UserService::get_user(db, user_id)
            .await
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid refresh token")))?;

        if !user.is_active {
            return Err(AppError::forbidden(anyhow!("This account has been deactivated")));
        }

        Self::issue_tokens(user, jwt_config)
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: UserId,
        dto: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if !verify_password(&dto.current_password, &current_hash)? {
            return Err(AppError::bad_request(anyhow!("Current password is incorrect")));
        }

        if dto.current_password == dto.new_password {
            return Err(AppError::bad_request(anyhow!(
                "New password must differ from the current password"
            )));
        }

        let new_hash = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(&new_hash)
            .execute(db)
            .await?;

        Ok(())
    }
}
