//! Courses and enrollment.
//!
//! A course is one offering of a subject in a given academic year and session,
//! taught by at most one faculty member and capped at `max_students`.

use chrono::{DateTime, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::{
    deserialize_optional_parsed, deserialize_optional_string, deserialize_optional_uuid,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::academic::Session;
use crate::ids::{CourseId, FacultyId, StudentId, SubjectId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub subject_id: SubjectId,
    pub faculty_id: Option<FacultyId>,
    pub academic_year: String,
    pub session: Session,
    pub max_students: i32,
    /// Students currently on the roster
    pub enrolled_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn is_full(&self) -> bool {
        self.enrolled_count >= i64::from(self.max_students)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub subject_id: SubjectId,
    pub faculty_id: Option<FacultyId>,
    #[validate(custom(function = "crate::academic::validate_academic_year"))]
    pub academic_year: String,
    pub session: Session,
    #[validate(range(min = 1, max = 1000, message = "max_students must be between 1 and 1000"))]
    pub max_students: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub faculty_id: Option<FacultyId>,
    #[validate(range(min = 1, max = 1000, message = "max_students must be between 1 and 1000"))]
    pub max_students: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub subject_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub faculty_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub session: Option<Session>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EnrollStudentDto {
    pub student_id: StudentId,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub student_id: StudentId,
    pub enrolled_at: DateTime<Utc>,
}

/// A roster line.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EnrolledStudent {
    pub student_id: StudentId,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentRejection {
    AlreadyEnrolled,
    CourseFull,
}

impl fmt::Display for EnrollmentRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyEnrolled => f.write_str("Student is already enrolled in this course"),
            Self::CourseFull => f.write_str("Course is full"),
        }
    }
}

impl std::error::Error for EnrollmentRejection {}

/// Decides whether one more student may join a course. A duplicate is reported
/// before capacity so re-enrolling into a full course says "already enrolled".
pub fn check_enrollment(
    already_enrolled: bool,
    enrolled_count: i64,
    max_students: i32,
) -> Result<(), EnrollmentRejection> {
    if already_enrolled {
        return Err(EnrollmentRejection::AlreadyEnrolled);
    }
    if enrolled_count >= i64::from(max_students) {
        return Err(EnrollmentRejection::CourseFull);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_allowed_below_capacity() {
        assert_eq!(check_enrollment(false, 0, 1), Ok(()));
        assert_eq!(check_enrollment(false, 29, 30), Ok(()));
    }

    #[test]
    fn test_enrollment_full() {
        let err = check_enrollment(false, 1, 1).unwrap_err();
        assert_eq!(err, EnrollmentRejection::CourseFull);
        assert_eq!(err.to_string(), "Course is full");
        assert!(check_enrollment(false, 31, 30).is_err());
    }

    #[test]
    fn test_duplicate_reported_before_capacity() {
        let err = check_enrollment(true, 1, 1).unwrap_err();
        assert_eq!(err, EnrollmentRejection::AlreadyEnrolled);
        assert_eq!(err.to_string(), "Student is already enrolled in this course");
    }

    #[test]
    fn test_create_course_dto_validation() {
        let dto: CreateCourseDto = serde_json::from_value(serde_json::json!({
            "code": "PHY-8A",
            "name": "Physics 8A",
            "subject_id": "12345678-1234-1234-1234-123456789abc",
            "academic_year": "2024-2025",
            "session": "1",
            "max_students": 0
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("max_students"));

        let dto = CreateCourseDto {
            max_students: 30,
            academic_year: "2024-2026".to_string(),
            ..dto
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("academic_year"));
    }

    #[test]
    fn test_filter_ignores_blank_ids() {
        let params: CourseFilterParams =
            serde_json::from_str(r#"{"subject_id":"","session":"2"}"#).unwrap();
        assert!(params.subject_id.is_none());
        assert_eq!(params.session, Some(Session::Second));
    }
}
