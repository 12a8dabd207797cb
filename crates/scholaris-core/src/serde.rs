//! Deserialization helpers for query-string filters.
//!
//! Browsers and the dashboard send `?student_id=` for "no filter", so empty
//! strings must become `None` instead of a parse error.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Any `FromStr` filter (enums, dates) where an empty value means "not set".
pub fn deserialize_optional_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        student_id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        academic_year: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_parsed")]
        on: Option<chrono::NaiveDate>,
    }

    #[test]
    fn test_empty_values_become_none() {
        let f: Filter = serde_json::from_str(r#"{"student_id":"","academic_year":"  "}"#).unwrap();
        assert!(f.student_id.is_none());
        assert!(f.academic_year.is_none());
    }

    #[test]
    fn test_present_values_parse() {
        let f: Filter = serde_json::from_str(
            r#"{"student_id":"12345678-1234-1234-1234-123456789abc","academic_year":"2024-2025"}"#,
        )
        .unwrap();
        assert_eq!(
            f.student_id,
            Some(Uuid::from_u128(0x12345678_1234_1234_1234_123456789abc))
        );
        assert_eq!(f.academic_year.as_deref(), Some("2024-2025"));
    }

    #[test]
    fn test_missing_fields_default() {
        let f: Filter = serde_json::from_str("{}").unwrap();
        assert!(f.student_id.is_none());
        assert!(f.academic_year.is_none());
    }

    #[test]
    fn test_parsed_filter_treats_empty_as_unset() {
        let f: Filter = serde_json::from_str(r#"{"on":""}"#).unwrap();
        assert!(f.on.is_none());

        let f: Filter = serde_json::from_str(r#"{"on":"2024-09-02"}"#).unwrap();
        assert_eq!(f.on, chrono::NaiveDate::from_ymd_opt(2024, 9, 2));

        let result: Result<Filter, _> = serde_json::from_str(r#"{"on":"monday"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        let result: Result<Filter, _> = serde_json::from_str(r#"{"student_id":"nope"}"#);
        assert!(result.is_err());
    }
}
