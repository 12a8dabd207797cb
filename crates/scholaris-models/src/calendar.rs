use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::{deserialize_optional_parsed, deserialize_optional_string};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ids::{CalendarEventId, UserId};

text_enum!(
    EventType {
        Holiday => "holiday",
        Exam => "exam",
        Meeting => "meeting",
        Event => "event",
        TermStart => "term_start",
        TermEnd => "term_end",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CalendarEvent {
    pub id: CalendarEventId,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub academic_year: String,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn end_before_start() -> ValidationError {
    let mut err = ValidationError::new("end_date");
    err.message = Some("end_date must not be before start_date".into());
    err
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateCalendarEventDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    /// Defaults to `start_date` for single-day events
    pub end_date: Option<NaiveDate>,
    #[validate(custom(function = "crate::academic::validate_academic_year"))]
    pub academic_year: String,
}

fn validate_create_dates(dto: &CreateCalendarEventDto) -> Result<(), ValidationError> {
    match dto.end_date {
        Some(end) if end < dto.start_date => Err(end_before_start()),
        _ => Ok(()),
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCalendarEventDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Checked by the service after merging an update with the stored row.
pub fn check_event_dates(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        Err(end_before_start())
    } else {
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub event_type: Option<EventType>,
    /// Events ending on or after this date
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub from: Option<NaiveDate>,
    /// Events starting on or before this date
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub to: Option<NaiveDate>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_day_event() {
        let dto: CreateCalendarEventDto = serde_json::from_str(
            r#"{"title":"Sports Day","event_type":"event","start_date":"2025-01-24","academic_year":"2024-2025"}"#,
        )
        .unwrap();
        assert!(dto.end_date.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let dto = CreateCalendarEventDto {
            title: "Winter break".to_string(),
            description: None,
            event_type: EventType::Holiday,
            start_date: date("2024-12-23"),
            end_date: Some(date("2024-12-20")),
            academic_year: "2024-2025".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_check_event_dates() {
        assert!(check_event_dates(date("2025-03-01"), date("2025-03-01")).is_ok());
        assert!(check_event_dates(date("2025-03-02"), date("2025-03-01")).is_err());
    }
}
