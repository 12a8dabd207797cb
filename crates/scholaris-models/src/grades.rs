use chrono::{DateTime, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::{
    deserialize_optional_parsed, deserialize_optional_string, deserialize_optional_uuid,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::academic::Session;
use crate::ids::{CourseId, FacultyId, GradeId, StudentId};

text_enum!(
    AssessmentType {
        Quiz => "quiz",
        Assignment => "assignment",
        Midterm => "midterm",
        Final => "final",
        Project => "project",
        Practical => "practical",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: GradeId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub faculty_id: Option<FacultyId>,
    pub assessment_type: AssessmentType,
    pub marks_obtained: f64,
    pub max_marks: f64,
    pub percentage: f64,
    pub letter_grade: String,
    pub academic_year: String,
    pub session: Session,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_marks"))]
pub struct CreateGradeDto {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub assessment_type: AssessmentType,
    #[validate(range(min = 0.0, message = "marks_obtained cannot be negative"))]
    pub marks_obtained: f64,
    #[validate(range(exclusive_min = 0.0, max = 1000.0, message = "max_marks must be above 0"))]
    pub max_marks: f64,
    #[validate(custom(function = "crate::academic::validate_academic_year"))]
    pub academic_year: String,
    pub session: Session,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

fn marks_exceed_max() -> ValidationError {
    let mut err = ValidationError::new("marks_obtained");
    err.message = Some("marks_obtained cannot exceed max_marks".into());
    err
}

fn validate_create_marks(dto: &CreateGradeDto) -> Result<(), ValidationError> {
    if dto.marks_obtained > dto.max_marks {
        return Err(marks_exceed_max());
    }
    Ok(())
}

/// Marks may be corrected after recording; the stored `max_marks` is kept unless
/// a new one is sent. The combined check happens in the service once both are known.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    #[validate(range(min = 0.0, message = "marks_obtained cannot be negative"))]
    pub marks_obtained: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 1000.0, message = "max_marks must be above 0"))]
    pub max_marks: Option<f64>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GradeFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub course_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub assessment_type: Option<AssessmentType>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub session: Option<Session>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

/// Percentage rounded to two decimals. `max_marks` is validated to be positive.
pub fn grade_percentage(marks_obtained: f64, max_marks: f64) -> f64 {
    if max_marks <= 0.0 {
        return 0.0;
    }
    (marks_obtained / max_marks * 10_000.0).round() / 100.0
}

pub fn letter_grade(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "A+",
        p if p >= 80.0 => "A",
        p if p >= 70.0 => "B+",
        p if p >= 60.0 => "B",
        p if p >= 50.0 => "C",
        p if p >= 40.0 => "D",
        _ => "F",
    }
}

/// Rejects a marks/max pair where the marks exceed the maximum.
pub fn check_marks(marks_obtained: f64, max_marks: f64) -> Result<(), ValidationError> {
    if marks_obtained > max_marks {
        Err(marks_exceed_max())
    } else {
        Ok(())
    }
}
