//! Success envelope shared by every endpoint.
//!
//! ```json
//! { "success": true, "message": "Attendance recorded", "data": { ... } }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pagination::{PaginationMeta, PaginationParams};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// An envelope with no payload, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        Self {
            items,
            meta: PaginationMeta::new(total, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::new("Course created", 42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Course created");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn test_message_only_envelope_omits_data() {
        let json = serde_json::to_value(MessageResponse::new("Deleted")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_paginated_meta() {
        let page = Paginated::new(vec!["a", "b"], 5, &PaginationParams {
            page: Some(1),
            limit: Some(2),
        });
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.meta.total_pages, 3);
        assert!(page.meta.has_more);
    }
}
