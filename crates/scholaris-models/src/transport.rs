use chrono::{DateTime, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::deserialize_optional_string;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{StudentId, TransportRouteId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct RouteStop {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom(function = "crate::academic::validate_time_of_day"))]
    pub pickup_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TransportRoute {
    pub id: TransportRouteId,
    pub route_name: String,
    pub vehicle_number: String,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub capacity: i32,
    pub fare: i64,
    #[sqlx(json)]
    pub stops: Vec<RouteStop>,
    pub is_active: bool,
    /// Students currently assigned to the route
    pub assigned_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransportRoute {
    pub fn seats_left(&self) -> i64 {
        (i64::from(self.capacity) - self.assigned_count).max(0)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransportRouteDto {
    #[validate(length(min = 1, max = 100))]
    pub route_name: String,
    #[validate(length(min = 1, max = 30))]
    pub vehicle_number: String,
    #[validate(length(max = 100))]
    pub driver_name: Option<String>,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub driver_phone: Option<String>,
    #[validate(range(min = 1, max = 200, message = "capacity must be between 1 and 200"))]
    pub capacity: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub fare: i64,
    #[validate(nested)]
    #[serde(default)]
    pub stops: Vec<RouteStop>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTransportRouteDto {
    #[validate(length(min = 1, max = 30))]
    pub vehicle_number: Option<String>,
    #[validate(length(max = 100))]
    pub driver_name: Option<String>,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub driver_phone: Option<String>,
    #[validate(range(min = 1, max = 200, message = "capacity must be between 1 and 200"))]
    pub capacity: Option<i32>,
    #[validate(range(min = 0))]
    pub fare: Option<i64>,
    #[validate(nested)]
    pub stops: Option<Vec<RouteStop>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransportFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignStudentDto {
    pub student_id: StudentId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_stops_validated() {
        let dto: CreateTransportRouteDto = serde_json::from_value(json!({
            "route_name": "North Loop",
            "vehicle_number": "KA-01-AB-1234",
            "capacity": 40,
            "stops": [
                {"name": "Lake Gate", "pickup_time": "07:10"},
                {"name": "Market Square", "pickup_time": "7:25"}
            ]
        }))
        .unwrap();
        assert_eq!(dto.fare, 0);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_capacity_bounds() {
        let dto: CreateTransportRouteDto = serde_json::from_value(json!({
            "route_name": "East",
            "vehicle_number": "BUS-7",
            "capacity": 0
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("capacity"));
    }

    #[test]
    fn test_seats_left_never_negative() {
        let route = TransportRoute {
            id: TransportRouteId::new(),
            route_name: "West".to_string(),
            vehicle_number: "BUS-9".to_string(),
            driver_name: None,
            driver_phone: None,
            capacity: 2,
            fare: 1500,
            stops: vec![],
            is_active: true,
            assigned_count: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(route.seats_left(), 0);
    }
}
