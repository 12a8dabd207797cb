use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use scholaris_core::{AppError, FieldError};

/// Pulls the field name out of serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    message
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
}

fn reject(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if let Some(field) = missing_field(&error_msg) {
        let mut err = AppError::bad_request(anyhow!("Validation failed"));
        err.field_errors.push(FieldError {
            field: field.to_string(),
            message: format!("{} is required", field),
        });
        return err;
    }

    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::new(
            StatusCode::BAD_REQUEST,
            anyhow!("Missing 'Content-Type: application/json' header"),
        ),
        JsonRejection::JsonDataError(_) => {
            AppError::bad_request(anyhow!("Invalid field value in request body"))
        }
        JsonRejection::JsonSyntaxError(_) => AppError::bad_request(anyhow!("Malformed JSON body")),
        _ => AppError::bad_request(anyhow!("Invalid request body")),
    }
}

/// JSON body extractor that runs `validator` rules before the handler sees
/// the value. Failures become a 400 with one entry per offending field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(reject)?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

fn reject_query(rejection: QueryRejection) -> AppError {
    let detail = rejection.body_text();
    let detail = detail
        .strip_prefix("Failed to deserialize query string: ")
        .unwrap_or(&detail);
    AppError::bad_request(anyhow!("Invalid query parameter: {detail}"))
}

fn reject_path(rejection: PathRejection) -> AppError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(err) => {
            AppError::bad_request(anyhow!("Invalid path parameter: {}", err.body_text()))
        }
        other => AppError::new(other.status(), anyhow!(other.body_text())),
    }
}

/// Query-string extractor whose rejections use the JSON error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(reject_query)?;
        Ok(ApiQuery(value))
    }
}

/// Path extractor whose rejections use the JSON error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(reject_path)?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "name must be at least 3 characters"))]
        name: String,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_missing_field_parsing() {
        assert_eq!(
            missing_field("Failed to deserialize: missing field `email` at line 1"),
            Some("email")
        );
        assert_eq!(missing_field("expected value at line 1"), None);
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"Ada"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "Ada");
    }

    #[tokio::test]
    async fn test_rule_failure_is_field_error() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"A"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field_errors[0].field, "name");
    }

    #[tokio::test]
    async fn test_missing_field_is_reported_by_name() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field_errors[0].field, "name");
        assert_eq!(err.field_errors[0].message, "name is required");
    }

    #[derive(Debug, Deserialize)]
    struct Filter {
        page: Option<i64>,
    }

    #[tokio::test]
    async fn test_bad_query_is_bad_request() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/items?page=first")
            .body(())
            .unwrap()
            .into_parts();
        let err = ApiQuery::<Filter>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("Invalid query parameter"));
    }

    #[tokio::test]
    async fn test_good_query_passes() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/items?page=2")
            .body(())
            .unwrap()
            .into_parts();
        let ApiQuery(filter) = ApiQuery::<Filter>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(filter.page, Some(2));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Malformed JSON body");
    }
}
