//! Attendance records.
//!
//! One row per (student, course, date), guarded by the
//! `attendance_student_course_date_key` unique constraint. Rolls are submitted
//! in batches; a tuple that already exists is skipped, not rejected.

use chrono::{DateTime, NaiveDate, Utc};
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
use crate::ids::{AttendanceId, CourseId, FacultyId, StudentId, UserId};

/// Name of the unique constraint that keeps one record per student, course and day.
pub const ATTENDANCE_UNIQUE_CONSTRAINT: &str = "attendance_student_course_date_key";

text_enum!(
    AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
    }
);

impl AttendanceStatus {
    /// Late arrivals still count towards the attendance percentage.
    pub const fn counts_as_present(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attendance {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Faculty member teaching the course when the roll was taken
    pub faculty_id: Option<FacultyId>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub time_in: Option<String>,
    pub time_out: Option<String>,
    pub academic_year: String,
    pub session: Session,
    pub remarks: Option<String>,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of a roll.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_entry_times"))]
pub struct AttendanceEntryDto {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[validate(custom(function = "crate::academic::validate_time_of_day"))]
    pub time_in: Option<String>,
    #[validate(custom(function = "crate::academic::validate_time_of_day"))]
    pub time_out: Option<String>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

/// `HH:MM` strings order lexically, so a plain comparison is enough once both
/// are well formed.
fn validate_entry_times(entry: &AttendanceEntryDto) -> Result<(), ValidationError> {
    if let (Some(time_in), Some(time_out)) = (&entry.time_in, &entry.time_out)
        && crate::academic::validate_time_of_day(time_in).is_ok()
        && crate::academic::validate_time_of_day(time_out).is_ok()
        && time_out < time_in
    {
        let mut err = ValidationError::new("time_out");
        err.message = Some("time_out must not be earlier than time_in".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordAttendanceDto {
    #[validate(custom(function = "crate::academic::validate_academic_year"))]
    pub academic_year: String,
    pub session: Session,
    #[validate(length(min = 1, max = 500, message = "records must contain 1-500 entries"))]
    #[validate(nested)]
    pub records: Vec<AttendanceEntryDto>,
}

text_enum!(
    SkipReason {
        /// A record already exists for this student, course and date
        Duplicate => "duplicate",
        /// The student id does not exist
        UnknownStudent => "unknown_student",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SkippedEntry {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub reason: SkipReason,
}

/// Outcome of a roll submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecordAttendanceResult {
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub records: Vec<Attendance>,
    pub skipped: Vec<SkippedEntry>,
}

impl RecordAttendanceResult {
    pub fn push_created(&mut self, record: Attendance) {
        self.created += 1;
        self.records.push(record);
    }

    pub fn push_skipped(&mut self, entry: &AttendanceEntryDto, reason: SkipReason) {
        match reason {
            SkipReason::Duplicate => self.duplicates += 1,
            SkipReason::UnknownStudent => self.failed += 1,
        }
        self.skipped.push(SkippedEntry {
            student_id: entry.student_id,
            course_id: entry.course_id,
            date: entry.date,
            reason,
        });
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAttendanceRemarksDto {
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub course_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub to_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub session: Option<Session>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

/// Scope for a percentage or summary query.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendancePercentageQuery {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub course_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendancePercentage {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub total: i64,
    pub present_or_late: i64,
    pub percentage: f64,
}

/// Per-course breakdown for one student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceSummary {
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
    #[sqlx(skip)]
    #[serde(default)]
    pub percentage: f64,
}

impl AttendanceSummary {
    pub fn with_percentage(mut self) -> Self {
        self.percentage = attendance_percentage(self.present + self.late, self.total);
        self
    }
}

/// `present_or_late / total * 100`, or `0` when nothing was recorded.
pub fn attendance_percentage(present_or_late: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    present_or_late as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(time_in: Option<&str>, time_out: Option<&str>) -> serde_json::Value {
        json!({
            "student_id": "11111111-1111-1111-1111-111111111111",
            "course_id": "22222222-2222-2222-2222-222222222222",
            "date": "2024-09-02",
            "status": "present",
            "time_in": time_in,
            "time_out": time_out,
        })
    }

    #[test]
    fn test_percentage_zero_when_empty() {
        assert_eq!(attendance_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_percentage_counts_ratio() {
        assert_eq!(attendance_percentage(3, 4), 75.0);
        assert_eq!(attendance_percentage(4, 4), 100.0);
        assert_eq!(attendance_percentage(0, 5), 0.0);
    }

    #[test]
    fn test_late_counts_as_present() {
        assert!(AttendanceStatus::Present.counts_as_present());
        assert!(AttendanceStatus::Late.counts_as_present());
        assert!(!AttendanceStatus::Absent.counts_as_present());
        assert!(!AttendanceStatus::Excused.counts_as_present());
    }

    #[test]
    fn test_entry_time_order() {
        let ok: AttendanceEntryDto = serde_json::from_value(entry(Some("08:00"), Some("14:30"))).unwrap();
        assert!(ok.validate().is_ok());

        let reversed: AttendanceEntryDto =
            serde_json::from_value(entry(Some("14:30"), Some("08:00"))).unwrap();
        assert!(reversed.validate().is_err());

        let signed: AttendanceEntryDto =
            serde_json::from_value(entry(Some("09:00"), Some("+1:00"))).unwrap();
        assert!(signed.validate().unwrap_err().field_errors().contains_key("time_out"));
    }

    #[test]
    fn test_entry_bad_time_format() {
        let dto: AttendanceEntryDto = serde_json::from_value(entry(Some("8am"), None)).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("time_in"));
    }

    #[test]
    fn test_batch_requires_records() {
        let dto: RecordAttendanceDto = serde_json::from_value(json!({
            "academic_year": "2024-2025",
            "session": "1",
            "records": []
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let records = field_errors["records"];
        assert_eq!(
            records[0].message.as_deref(),
            Some("records must contain 1-500 entries")
        );
    }

    #[test]
    fn test_batch_validates_nested_entries() {
        let dto: RecordAttendanceDto = serde_json::from_value(json!({
            "academic_year": "2024-2025",
            "session": "2",
            "records": [entry(None, None), entry(Some("25:00"), None)]
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_result_tallies() {
        let dto: AttendanceEntryDto = serde_json::from_value(entry(None, None)).unwrap();
        let mut result = RecordAttendanceResult::default();
        result.push_skipped(&dto, SkipReason::Duplicate);
        result.push_skipped(&dto, SkipReason::UnknownStudent);
        assert_eq!(result.duplicates, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.created, 0);
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.skipped[0].reason, SkipReason::Duplicate);
    }

    #[test]
    fn test_summary_percentage() {
        let summary = AttendanceSummary {
            course_id: CourseId::new(),
            course_code: "MATH-8".to_string(),
            course_name: "Mathematics 8".to_string(),
            total: 10,
            present: 6,
            absent: 2,
            late: 2,
            excused: 0,
            percentage: 0.0,
        }
        .with_percentage();
        assert_eq!(summary.percentage, 80.0);
    }
}
