use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use rrp_service::{RatingView, SubmissionOutcome};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Successful response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub http_status: u16,
    pub request_id: String,
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(request_id: Uuid, body: T) -> Self {
        Self {
            http_status: 200,
            request_id: request_id.to_string(),
            body,
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": "rrp-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /v1/ratings`
pub async fn submit_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope<SubmissionOutcome>>, ApiError> {
    let request_id = Uuid::now_v7();
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        ApiError::bad_request(request_id, format!("Submission must be valid JSON: {e}"))
    })?;
    tracing::debug!(%request_id, "submission received");

    let outcome = state
        .pool
        .submit(&payload)
        .await
        .map_err(|e| ApiError::from_service(request_id, e))?;
    Ok(Json(Envelope::ok(request_id, outcome)))
}

/// `GET /v1/ratings/:name`
pub async fn query_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Envelope<RatingView>>, ApiError> {
    let request_id = Uuid::now_v7();
    tracing::debug!(%request_id, restaurant = %name, "query received");

    let view = state
        .pool
        .get(&name)
        .await
        .map_err(|e| ApiError::from_service(request_id, e))?;
    Ok(Json(Envelope::ok(request_id, view)))
}
