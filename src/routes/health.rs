/**
 * Health Routes
 * Endpoint for checking that the service is up
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Build version reported by the healthcheck
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceCheck {
    fn healthy(elapsed: std::time::Duration) -> Self {
        Self {
            status: "healthy".to_string(),
            response_time: Some(elapsed.as_millis() as u64),
            error: None,
        }
    }

    fn unhealthy(error: impl ToString) -> Self {
        Self {
            status: "unhealthy".to_string(),
            response_time: None,
            error: Some(error.to_string()),
        }
    }
}

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckMessage {
    pub status: String,
    pub environment: String,
    pub version: String,
    pub uptime: u64,
    pub database: ServiceCheck,
}

/// GET /v1/healthcheck
///
/// Always 200 while the process serves requests; the database check is
/// reported, not enforced.
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    let database = match crate::db::health_check(state.pool()).await {
        Ok(elapsed) => ServiceCheck::healthy(elapsed),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            ServiceCheck::unhealthy(e)
        }
    };

    let message = HealthCheckMessage {
        status: "available".to_string(),
        environment: state.config().environment.clone(),
        version: VERSION.to_string(),
        uptime: state.started().elapsed().as_secs(),
        database,
    };

    (StatusCode::OK, Json(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_check_omits_empty_fields() {
        let check = ServiceCheck::healthy(std::time::Duration::from_millis(10));
        let json = serde_json::to_string(&check).unwrap();
        assert_eq!(json, r#"{"status":"healthy","responseTime":10}"#);

        let json = serde_json::to_string(&ServiceCheck::unhealthy("down")).unwrap();
        assert_eq!(json, r#"{"status":"unhealthy","error":"down"}"#);
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
