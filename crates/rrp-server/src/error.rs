use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use rrp_service::ServiceError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// A failed request, rendered as `{ httpStatus, body, requestId }`.
#[derive(Debug)]
pub struct ApiError {
    pub request_id: Uuid,
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(request_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            request_id,
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Validation failures are the caller's to fix; everything else is ours.
    pub fn from_service(request_id: Uuid, error: ServiceError) -> Self {
        if error.is_client_error() {
            return Self::bad_request(request_id, error.to_string());
        }
        tracing::error!(%request_id, %error, "request failed");
        Self {
            request_id,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "httpStatus": self.status.as_u16(),
            "body": self.message,
            "requestId": self.request_id.to_string(),
        });
        (self.status, Json(body)).into_response()
    }
}
