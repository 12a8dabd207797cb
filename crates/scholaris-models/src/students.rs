//! Student profiles.
//!
//! A student is a `users` row with role `student` plus a `students` profile row.
//! The optional `parent_user_id` links the profile to a `parent` account, which
//! is what lets a parent read their child's records.

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::deserialize_optional_string;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{StudentId, TransportRouteId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub grade_level: String,
    pub section: Option<String>,
    pub parent_user_id: Option<UserId>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub transport_route_id: Option<TransportRouteId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 30))]
    pub student_number: String,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub grade_level: String,
    #[validate(length(max = 10))]
    pub section: Option<String>,
    pub parent_user_id: Option<UserId>,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub grade_level: Option<String>,
    #[validate(length(max = 10))]
    pub section: Option<String>,
    pub parent_user_id: Option<UserId>,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub grade_level: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub section: Option<String>,
    /// Matches name, email, or student number
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

/// Query parameter used on `/api/student/*` routes. Students may omit it;
/// parents must name one of their children.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentScopeQuery {
    #[serde(default, deserialize_with = "scholaris_core::serde::deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<uuid::Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> CreateStudentDto {
        CreateStudentDto {
            first_name: "Lena".to_string(),
            last_name: "Park".to_string(),
            email: "lena.park@school.edu".to_string(),
            password: "password123".to_string(),
            student_number: "STU-2024-0042".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2011, 4, 2),
            gender: Some("female".to_string()),
            grade_level: "8".to_string(),
            section: Some("B".to_string()),
            parent_user_id: None,
            phone: None,
            address: None,
            admission_date: None,
        }
    }

    #[test]
    fn test_create_student_dto_valid() {
        assert!(valid_dto().validate().is_ok());
    }

    #[test]
    fn test_create_student_dto_missing_grade() {
        let dto = CreateStudentDto {
            grade_level: String::new(),
            ..valid_dto()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("grade_level"));
    }

    #[test]
    fn test_update_dto_empty_is_valid() {
        assert!(UpdateStudentDto::default().validate().is_ok());
    }

    #[test]
    fn test_update_dto_rejects_long_section() {
        let dto = UpdateStudentDto {
            section: Some("ABCDEFGHIJK".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_scope_query_blank_student_id() {
        let q: StudentScopeQuery = serde_json::from_str(r#"{"student_id":""}"#).unwrap();
        assert!(q.student_id.is_none());
    }
}
