//! Request-time errors.
//!
//! Handlers return `AppErrorResponse`, which pairs an `AppError` with the
//! request ID so the failure can be correlated with server logs. Clients only
//! ever see a generic message; the detail stays in the log.

use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::middleware::RequestId;

/// Message returned to clients for every internal failure
pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),

    #[error("Hostname lookup failed: {0}")]
    Hostname(#[source] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// An error annotated with the request it happened in.
#[derive(Debug)]
pub struct AppErrorResponse {
    pub error: AppError,
    pub request_id: Option<RequestId>,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl From<AppError> for AppErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error,
            request_id: None,
        }
    }
}

impl IntoResponse for AppErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let request_id = self.request_id.map(|id| id.0.to_string());

        tracing::error!(
            error = %self.error,
            error_debug = ?self.error,
            request_id = request_id.as_deref().unwrap_or("-"),
            "Request failed"
        );

        let body = ErrorBody {
            detail: INTERNAL_ERROR_DETAIL,
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        AppErrorResponse::from(self).into_response()
    }
}

/// Attach the current request ID to an error result.
pub trait ResultExt<T> {
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse> {
        self.map_err(|e| AppErrorResponse {
            error: e.into(),
            request_id: Some(request_id.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_error_body_hides_detail() {
        let request_id = RequestId(Uuid::new_v4());
        let result: Result<(), AppError> = Err(AppError::Hostname(io::Error::new(
            io::ErrorKind::Other,
            "secret socket detail",
        )));

        let response = result.with_request_id(&request_id).unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], INTERNAL_ERROR_DETAIL);
        assert_eq!(json["request_id"], request_id.0.to_string());
        assert!(!String::from_utf8_lossy(&body).contains("secret"));
    }

    #[tokio::test]
    async fn test_error_without_request_id() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "detail": "Internal server error" }));
    }
}
