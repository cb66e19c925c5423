//! Application error types.
//!
//! API handlers return [`AppError`], rendered as a JSON `{"message": ...}`
//! body. HTML handlers wrap the same error in [`PageError`], rendered as a
//! plain status page.

use std::collections::BTreeMap;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DataError;

const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("the requested resource could not be found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("one or more fields failed validation")]
    FailedValidation(BTreeMap<String, String>),

    #[error("authentication required")]
    Unauthorized { realm: String },

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),

    #[error(transparent)]
    Data(DataError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound => AppError::NotFound,
            other => AppError::Data(other),
        }
    }
}

/// JSON error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: serde_json::Value,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Data(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn log(&self) {
        match self {
            AppError::Data(e) => tracing::error!(error = %e, "data error"),
            AppError::Template(e) => tracing::error!(error = ?e, "template error"),
            AppError::Internal(detail) => tracing::error!(%detail, "internal error"),
            _ => {}
        }
    }

    fn message(&self) -> serde_json::Value {
        match self {
            AppError::FailedValidation(errors) => serde_json::json!(errors),
            AppError::Data(_) | AppError::Template(_) | AppError::Internal(_) => {
                SERVER_ERROR_MESSAGE.into()
            }
            other => other.to_string().into(),
        }
    }

    fn decorate(&self, response: &mut Response) {
        if let AppError::Unauthorized { realm } = self {
            let challenge = format!("Basic realm=\"{}\"", realm.replace('"', ""));
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let mut response = (
            self.status(),
            Json(ErrorMessage {
                message: self.message(),
            }),
        )
            .into_response();
        self.decorate(&mut response);
        response
    }
}

/// Error of an HTML page handler.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl From<DataError> for PageError {
    fn from(err: DataError) -> Self {
        PageError(err.into())
    }
}

impl From<tera::Error> for PageError {
    fn from(err: tera::Error) -> Self {
        PageError(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log();

        let status = self.0.status();
        let text = status.canonical_reason().unwrap_or("Error");
        let mut response = (status, text).into_response();
        self.0.decorate(&mut response);
        response
    }
}
