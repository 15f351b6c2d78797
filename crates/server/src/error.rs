//! HTTP mapping of service errors.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use ndata_core::{Error, IGNORE_WINDOW};

/// Errors returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid request parameters (e.g., short database id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Service(#[from] Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::Service(Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(Error::DatabaseIgnored(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Service(Error::FetchFailed { .. } | Error::ListFailed(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Service(Error::Unsupported(_)) => StatusCode::NOT_IMPLEMENTED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) | ApiError::Service(Error::InvalidInput(_)) => "INVALID_INPUT",
            ApiError::Service(Error::DatabaseIgnored(_)) => "DATABASE_IGNORED",
            ApiError::Service(Error::FetchFailed { .. } | Error::ListFailed(_)) => "FETCH_FAILED",
            ApiError::Service(Error::Unsupported(_)) => "UNSUPPORTED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "Request rejected");
        }

        let body = Json(serde_json::json!({
            "success": false,
            "code": self.code(),
            "message": self.to_string(),
        }));
        let mut response = (status, body).into_response();

        if matches!(self, ApiError::Service(Error::DatabaseIgnored(_))) {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(IGNORE_WINDOW.as_secs()));
        }

        response
    }
}
