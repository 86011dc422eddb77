//! Status endpoint and the shared API error type.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use formmailer_core::errors::{TransportError, ValidationError};
use formmailer_core::models::Reference;

use crate::AppState;

/// Status response.
#[derive(Serialize)]
struct StatusResponse {
    message: String,
    status: String,
    timestamp: String,
    version: String,
    uptime_secs: u64,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/status", get(get_status))
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "formmailer API operational".into(),
        status: "OK".into(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

// ---------------------------------------------------------------------------
// Shared error type for API handlers
// ---------------------------------------------------------------------------

/// API error type that converts to a `{success: false, error, ...}` JSON
/// response.
#[derive(Debug)]
pub enum AppError {
    /// Body could not be parsed.
    BadRequest(String),
    /// Submitted fields failed validation.
    Validation(ValidationError),
    /// The mail transport is not configured.
    Unavailable(String),
    /// The transport failed to deliver the message.
    SendFailed {
        error: TransportError,
        reference: Reference,
        at: DateTime<Utc>,
    },
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SendFailed { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// User-facing message for a failed send, adapted to the failure kind.
pub fn send_failure_message(error: &TransportError) -> &'static str {
    match error {
        TransportError::Auth(_) => "Email authentication failed",
        TransportError::Connection(_) => "Unable to connect to the email server",
        TransportError::Timeout(_) => "Timed out connecting to the email server",
        _ => GENERIC_SEND_FAILURE,
    }
}

/// Fallback message when the failure kind has no specific wording.
pub const GENERIC_SEND_FAILURE: &str = "Failed to send the email";

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        let body = match self {
            AppError::BadRequest(msg) | AppError::Unavailable(msg) | AppError::Internal(msg) => {
                json!({ "success": false, "error": msg })
            }
            AppError::Validation(ValidationError::Missing { fields }) => json!({
                "success": false,
                "error": "All fields are required",
                "missingFields": fields.iter().map(|f| f.label()).collect::<Vec<_>>(),
            }),
            AppError::Validation(ValidationError::Invalid { errors }) => json!({
                "success": false,
                "error": errors.join(". "),
                "errors": errors,
            }),
            AppError::SendFailed {
                error,
                reference,
                at,
            } => json!({
                "success": false,
                "error": send_failure_message(&error),
                "details": error.to_string(),
                "timestamp": at.to_rfc3339(),
                "reference": reference,
            }),
        };

        (status, Json(body)).into_response()
    }
}
