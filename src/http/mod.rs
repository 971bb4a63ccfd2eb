//! HTTP API: intake and status reads.
//!
//! POST /api/audits            -> 202 { "jobId": ... }
//! POST /api/webhooks/intake   -> 202, vendor field names remapped first
//! GET  /api/audits/{id}       -> 200 payload + X-Cache + Cache-Control
//! GET  /healthz               -> 200 once the store answers

pub mod forms;

use crate::db::Db;
use crate::error::Error;
use crate::intake::IntakeService;
use crate::model::JobId;
use crate::status::StatusService;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared handler state, constructed once at process start.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub intake: Arc<IntakeService>,
    pub status: Arc<StatusService>,
    /// Cache-Control max-age advertised on status reads, seconds.
    pub status_max_age_secs: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/audits", post(submit_audit))
        .route("/api/audits/:id", get(read_status))
        .route("/api/webhooks/intake", post(intake_webhook))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct IntakeRequest {
    site: Option<String>,
    contact: Option<String>,
}

/// Submitters always get a job id synchronously; downstream failures are
/// visible only through later status reads.
async fn submit_audit(
    State(state): State<AppState>,
    Json(req): Json<IntakeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .intake
        .submit(
            req.site.as_deref().unwrap_or(""),
            req.contact.as_deref().unwrap_or(""),
        )
        .await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "jobId": id.0 }))))
}

/// Vendor webhook intake: remap external field names, then run the same
/// intake path.
async fn intake_webhook(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let (site, contact) = forms::remap(&payload);
    let id = state.intake.submit(&site, &contact).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "jobId": id.0 }))))
}

async fn read_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let read = state.status.read(JobId(id)).await?;

    let mut response = (StatusCode::OK, Json(read.payload)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(&format!("max-age={}", state.status_max_age_secs))
            .unwrap_or(HeaderValue::from_static("max-age=30")),
    );
    headers.insert(
        "x-cache",
        HeaderValue::from_static(read.origin.as_str()),
    );
    Ok(response)
}

async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.db.health_check().await?;
    Ok(StatusCode::OK)
}

/// Wrapper mapping crate errors to HTTP responses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::Store(_) | Error::Cache(_) => {
                tracing::error!("infra error on request: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            other => {
                tracing::error!("unexpected error on request: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
