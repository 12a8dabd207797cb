use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::deserialize_optional_string;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{FacultyId, UserId};

/// A teaching staff profile joined with its user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Faculty {
    pub id: FacultyId,
    pub user_id: UserId,
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub qualification: Option<String>,
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFacultyDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 30))]
    pub employee_number: String,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 100))]
    pub designation: Option<String>,
    #[validate(length(max = 200))]
    pub qualification: Option<String>,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFacultyDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 100))]
    pub designation: Option<String>,
    #[validate(length(max = 200))]
    pub qualification: Option<String>,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FacultyFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_faculty_dto() {
        let dto = CreateFacultyDto {
            first_name: "Ravi".to_string(),
            last_name: "Menon".to_string(),
            email: "ravi.menon@school.edu".to_string(),
            password: "chalk-and-board".to_string(),
            employee_number: "EMP-017".to_string(),
            department: Some("Mathematics".to_string()),
            designation: Some("Senior Teacher".to_string()),
            qualification: None,
            phone: None,
            joining_date: NaiveDate::from_ymd_opt(2019, 6, 1),
        };
        assert!(dto.validate().is_ok());

        let bad = CreateFacultyDto {
            employee_number: String::new(),
            email: "ravi".to_string(),
            ..dto
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("employee_number"));
        assert!(errors.field_errors().contains_key("email"));
    }
}
