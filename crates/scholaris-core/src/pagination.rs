//! Page-based pagination for list endpoints.
//!
//! List endpoints accept `?page=&limit=` and answer with a [`Paginated`]
//! payload whose `meta` is a [`PaginationMeta`].
//!
//! - `limit` is clamped to [1, 100] and defaults to 20
//! - `page` is 1-indexed and clamped to a minimum of 1
//!
//! [`Paginated`]: crate::response::Paginated

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Query strings arrive as text, and an empty `?page=` means "not set".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Metadata describing where a page sits in the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

impl PaginationMeta {
    #[must_use]
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let page = params.page();
        let total = total.max(0);
        let total_pages = total.saturating_add(limit - 1) / limit;

        Self {
            total,
            page,
            limit,
            total_pages,
            has_more: page < total_pages,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, 1-indexed (default 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page, 1-100 (default 20)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
        PaginationParams { page, limit }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), DEFAULT_LIMIT);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        let cases = [(Some(0), 1), (Some(-3), 1), (Some(50), 50), (Some(500), 100)];
        for (input, expected) in cases {
            assert_eq!(params(None, input).limit(), expected);
        }
    }

    #[test]
    fn test_offset_follows_page() {
        assert_eq!(params(Some(3), Some(25)).offset(), 50);
        assert_eq!(params(Some(-2), Some(10)).offset(), 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let p = params(Some(i64::MAX), Some(100));
        assert_eq!(p.offset(), i64::MAX);

        let meta = PaginationMeta::new(i64::MAX, &p);
        assert_eq!(meta.total_pages, i64::MAX / 100);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_last_page() {
        let meta = PaginationMeta::new(45, &params(Some(3), Some(20)));
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_has_more() {
        let meta = PaginationMeta::new(45, &params(Some(1), Some(20)));
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_more);
    }

    #[test]
    fn test_meta_empty_result() {
        let meta = PaginationMeta::new(0, &PaginationParams::default());
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_deserialize_strings_and_blanks() {
        let p: PaginationParams = serde_json::from_str(r#"{"page":"2","limit":""}"#).unwrap();
        assert_eq!(p.page(), 2);
        assert_eq!(p.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        let result: Result<PaginationParams, _> = serde_json::from_str(r#"{"page":"two"}"#);
        assert!(result.is_err());
    }
}
