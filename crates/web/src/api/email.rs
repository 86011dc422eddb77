//! Email endpoints: SMTP connectivity check and transfer-request submission.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use formmailer_core::models::SubmissionForm;
use formmailer_core::reference;
use formmailer_core::transport::OutgoingEmail;
use formmailer_core::validate::validate_submission;

use crate::api::status::AppError;
use crate::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    success: bool,
    message: String,
    reference: String,
    message_id: String,
    timestamp: String,
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/test-email", get(test_email))
        .route("/send-email", post(send_email))
}

/// GET /test-email: verify SMTP connectivity without sending anything.
///
/// Always answers 200; the outcome is in `success`.
async fn test_email(State(state): State<Arc<AppState>>) -> Json<Value> {
    info!("SMTP connectivity check requested");

    let Some(mailer) = state.mailer.as_ref() else {
        warn!("email transport not configured");
        return Json(json!({
            "success": false,
            "error": "Email transport not configured",
        }));
    };

    match mailer.verify_connection().await {
        Ok(()) => {
            info!(server = %mailer.describe(), "SMTP connection verified");
            let smtp = &state.config.smtp;
            Json(json!({
                "success": true,
                "message": "Email configuration OK - SMTP connection established",
                "config": {
                    "host": smtp.host,
                    "port": smtp.port,
                    "user": smtp.username,
                },
            }))
        }
        Err(e) => {
            error!(error = %e, "SMTP connection check failed");
            Json(json!({
                "success": false,
                "error": format!("SMTP error: {}", e),
                "suggestion": format!(
                    "Check the EMAIL_USER and {} environment variables",
                    state.config.smtp.password_env
                ),
            }))
        }
    }
}

/// POST /send-email: validate, render and send a confirmation email.
async fn send_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmissionForm>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, AppError> {
    info!("new transfer-request submission");

    let mailer = state.mailer.clone().ok_or_else(|| {
        error!("email transport not configured, rejecting submission");
        AppError::Unavailable("Email service unavailable - transport not configured".into())
    })?;

    let Json(form) = payload.map_err(|e| {
        warn!(error = %e, "malformed submission body");
        AppError::BadRequest(format!("Invalid request body: {}", e.body_text()))
    })?;

    let submission = validate_submission(form).map_err(|e| {
        warn!(reason = %e, "submission rejected");
        AppError::Validation(e)
    })?;

    let submitted_at = Utc::now();
    let reference = reference::generate_at(&state.config.mail.reference_prefix, submitted_at);
    debug!(%reference, to = %submission.dest_mail, "submission validated");

    let rendered = state
        .renderer
        .render(&submission, &reference, submitted_at)
        .map_err(|e| {
            error!(%reference, error = %e, "failed to render confirmation email");
            AppError::Internal("Failed to prepare the confirmation email".into())
        })?;

    let email = OutgoingEmail::new(submission.dest_mail.clone(), rendered);
    match mailer.send(email).await {
        Ok(receipt) => {
            info!(
                %reference,
                message_id = %receipt.message_id,
                response = %receipt.response,
                "confirmation email sent"
            );
            Ok(Json(SendEmailResponse {
                success: true,
                message: "Your request has been sent. Check your inbox.".into(),
                reference: reference.to_string(),
                message_id: receipt.message_id,
                timestamp: Utc::now().to_rfc3339(),
            }))
        }
        Err(e) => {
            error!(%reference, error = %e, "failed to send confirmation email");
            let at = Utc::now();
            Err(AppError::SendFailed {
                error: e,
                reference: reference::error_reference(at),
                at,
            })
        }
    }
}
