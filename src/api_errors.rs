use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::errors::EngageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        if code.is_server_error() {
            tracing::error!(status = %code, "{}", self);
        } else {
            tracing::debug!(status = %code, "{}", self);
        }
        (code, Json(ErrBody { error: self.to_string() })).into_response()
    }
}

impl From<EngageError> for AppError {
    fn from(err: EngageError) -> Self {
        match err {
            EngageError::Validation { field, message } => {
                AppError::BadRequest(format!("Validation error for {field}: {message}"))
            }
            EngageError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} '{id}' not found"))
            }
            EngageError::Precondition { message } => AppError::Conflict(message),
            EngageError::Inference { message } => AppError::Unprocessable(message),
            EngageError::Serialization { context, source } => {
                AppError::BadRequest(format!("Serialization {context} failed: {source}"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Malformed or wrongly typed request bodies are the caller's fault, whatever
/// status axum would pick for the rejection.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_engage_errors_to_status_codes() {
        let cases = [
            (EngageError::validation("session_count", "must be >= 1"), StatusCode::BAD_REQUEST),
            (EngageError::not_found("session", "abc"), StatusCode::NOT_FOUND),
            (EngageError::precondition("no prediction yet"), StatusCode::CONFLICT),
            (EngageError::inference("width 8, expected 9"), StatusCode::UNPROCESSABLE_ENTITY),
            (EngageError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn json_rejection_becomes_bad_request() {
        use axum::{body::Body, extract::FromRequest, http::Request};

        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"session_count": "five"}"#))
            .unwrap();
        let rejection = Json::<crate::features::UserInput>::from_request(req, &())
            .await
            .unwrap_err();

        let err = AppError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!err.to_string().is_empty());
    }
}
