//! Academic calendar primitives and shared validators.

use std::borrow::Cow;

use validator::ValidationError;

text_enum!(
    /// Half of an academic year. Sent and stored as `"1"` or `"2"`.
    Session {
        First => "1",
        Second => "2",
    }
);

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Accepts `"YYYY-YYYY"` where the second year follows the first, e.g. `"2024-2025"`.
pub fn validate_academic_year(value: &str) -> Result<(), ValidationError> {
    let err = || {
        invalid(
            "academic_year",
            "academic_year must look like 2024-2025 with consecutive years",
        )
    };

    let (start, end) = value.split_once('-').ok_or_else(err)?;
    if start.len() != 4 || end.len() != 4 {
        return Err(err());
    }

    let start: u16 = start.parse().map_err(|_| err())?;
    let end: u16 = end.parse().map_err(|_| err())?;
    if end != start + 1 || start < 1900 {
        return Err(err());
    }

    Ok(())
}

/// Accepts a 24-hour `"HH:MM"` time.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    let err = || invalid("time_of_day", "time must be HH:MM in 24-hour format");

    let (hours, minutes) = value.split_once(':').ok_or_else(err)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(err());
    }

    let hours: u8 = hours.parse().map_err(|_| err())?;
    let minutes: u8 = minutes.parse().map_err(|_| err())?;
    if hours > 23 || minutes > 59 {
        return Err(err());
    }

    Ok(())
}

/// Accepts digits with an optional leading `+` and spaces or dashes, 7 to 20 characters.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    let well_formed = value
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (i == 0 && c == '+'));

    if well_formed && (7..=20).contains(&value.len()) && digits >= 7 {
        Ok(())
    } else {
        Err(invalid("phone", "phone number is invalid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_wire_format() {
        assert_eq!(serde_json::to_string(&Session::First).unwrap(), r#""1""#);
        let s: Session = serde_json::from_str(r#""2""#).unwrap();
        assert_eq!(s, Session::Second);
        assert!(serde_json::from_str::<Session>(r#""3""#).is_err());
    }

    #[test]
    fn test_academic_year_valid() {
        assert!(validate_academic_year("2024-2025").is_ok());
        assert!(validate_academic_year("1999-2000").is_ok());
    }

    #[test]
    fn test_academic_year_invalid() {
        for value in ["2024", "2024-2026", "2025-2024", "24-25", "abcd-efgh", "2024/2025", ""] {
            assert!(validate_academic_year(value).is_err(), "{value} accepted");
        }
    }

    #[test]
    fn test_time_of_day() {
        assert!(validate_time_of_day("08:30").is_ok());
        assert!(validate_time_of_day("23:59").is_ok());
        for value in ["8:30", "24:00", "12:60", "noon", "12:3O", "+1:00", "08:+5"] {
            assert!(validate_time_of_day(value).is_err(), "{value} accepted");
        }
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+91 98765 43210").is_ok());
        assert!(validate_phone("555-123-4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("98+7654321").is_err());
    }
}
