//! User accounts and roles.

use chrono::{DateTime, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::{deserialize_optional_parsed, deserialize_optional_string};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::UserId;

text_enum!(
    /// The single role attached to every account.
    UserRole {
        Admin => "admin",
        Faculty => "faculty",
        Student => "student",
        Parent => "parent",
    }
);

/// A user as returned by the API. The password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub role: UserRole,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserStatusDto {
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub role: Option<UserRole>,
    /// Matches name or email, case-insensitive
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> CreateUserDto {
        CreateUserDto {
            email: "registrar@school.edu".to_string(),
            password: "s3cure-pass".to_string(),
            first_name: "Amara".to_string(),
            last_name: "Okafor".to_string(),
            role: UserRole::Admin,
            phone: Some("+1 555 010 2000".to_string()),
        }
    }

    #[test]
    fn test_role_text() {
        assert_eq!(UserRole::Faculty.as_str(), "faculty");
        assert_eq!("parent".parse::<UserRole>().unwrap(), UserRole::Parent);
        assert!("teacher".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_create_user_dto_valid() {
        assert!(valid_dto().validate().is_ok());
    }

    #[test]
    fn test_create_user_dto_rejects_bad_fields() {
        let dto = CreateUserDto {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            phone: Some("abc".to_string()),
            ..valid_dto()
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("phone"));
    }

    #[test]
    fn test_filter_params_from_query_pairs() {
        let params: UserFilterParams =
            serde_json::from_str(r#"{"role":"faculty","search":" okafor ","page":"2"}"#).unwrap();
        assert_eq!(params.role, Some(UserRole::Faculty));
        assert_eq!(params.search.as_deref(), Some("okafor"));
        assert_eq!(params.pagination.page(), 2);
    }
}
