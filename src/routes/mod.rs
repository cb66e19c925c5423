/**
 * Routes Module
 * JSON API handlers, HTML pages and the RSS feed
 */
pub mod health;
pub mod pages;
pub mod posts;
pub mod query;
pub mod rss;
pub mod socials;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::http::Method;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::filters::Metadata;
use crate::error::AppError;

/// Response body of every read endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub metadata: Metadata,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(metadata: Metadata, data: T) -> Self {
        Self { metadata, data }
    }

    /// A single record; point lookups carry no pagination.
    pub fn single(data: T) -> Self {
        Self::new(Metadata::default(), data)
    }
}

/// Response body of update and delete endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub id: i64,
    pub rows_affected: u64,
}

/// Path ids that are not positive integers name no resource.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            tracing::debug!(raw, "invalid id in path");
            Err(AppError::NotFound)
        }
    }
}

/// Unwrap a JSON body, turning any decoding failure into a 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "unable to parse JSON request body");
            Err(AppError::BadRequest(
                "unable to parse JSON request body".to_string(),
            ))
        }
    }
}

/// Fallback for a known path requested with an unsupported method.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}

/// Fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("0"), Err(AppError::NotFound)));
        assert!(matches!(parse_id("-3"), Err(AppError::NotFound)));
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound)));
    }

    #[test]
    fn test_single_envelope_has_empty_metadata() {
        let json = serde_json::to_value(Envelope::single("x")).unwrap();
        assert_eq!(json, serde_json::json!({"metadata": {}, "data": "x"}));
    }

    #[test]
    fn test_mutation_response_shape() {
        let json = serde_json::to_value(MutationResponse {
            message: "blog post updated".to_string(),
            id: 4,
            rows_affected: 1,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "blog post updated", "id": 4, "rows_affected": 1})
        );
    }
}
