use chrono::{DateTime, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::deserialize_optional_string;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::SubjectId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 20))]
    #[serde(default)]
    pub credits: i32,
    #[validate(length(max = 100))]
    pub department: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 20))]
    pub credits: Option<i32>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubjectFilterParams {
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
    fn test_credits_range() {
        let dto: CreateSubjectDto =
            serde_json::from_str(r#"{"code":"MATH101","name":"Algebra I"}"#).unwrap();
        assert_eq!(dto.credits, 0);
        assert!(dto.validate().is_ok());

        let dto = CreateSubjectDto { credits: 21, ..dto };
        assert!(dto.validate().is_err());
    }
}
