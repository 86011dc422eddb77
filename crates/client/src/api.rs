//! Network seam of the form controller.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use formmailer_core::models::SubmissionForm;

/// The server's answer to a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    /// HTTP status was 2xx.
    pub ok: bool,
    /// `error` field of the JSON body, if any.
    pub error: Option<String>,
    /// Full JSON body.
    pub body: Value,
}

impl ApiReply {
    /// Build from a status flag and a JSON body.
    pub fn from_body(ok: bool, body: Value) -> Self {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { ok, error, body }
    }

    /// `reference` field of a successful reply.
    pub fn reference(&self) -> Option<&str> {
        self.body.get("reference").and_then(Value::as_str)
    }
}

/// The request never produced a usable answer.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("unreadable response: {0}")]
    BadResponse(String),
}

/// Posts a submission to the API.
#[async_trait]
pub trait SubmitApi: Send + Sync {
    async fn submit(&self, form: &SubmissionForm) -> Result<ApiReply, NetworkError>;
}

/// [`SubmitApi`] over HTTP with a per-request timeout.
pub struct HttpSubmitApi {
    client: reqwest::Client,
    base_url: String,
    endpoint: String,
    timeout: Duration,
}

impl HttpSubmitApi {
    pub fn new(config: &crate::ClientConfig) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| NetworkError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            endpoint: format!("{}/send-email", config.api_base_url),
            timeout: config.request_timeout,
        })
    }

    /// `GET <path>` relative to the API base, returning the JSON body.
    pub async fn get_json(&self, path: &str) -> Result<ApiReply, NetworkError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| self.network_error(e))?;
        self.read_reply(response).await
    }

    async fn read_reply(&self, response: reqwest::Response) -> Result<ApiReply, NetworkError> {
        let ok = response.status().is_success();
        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout(self.timeout)
            } else {
                NetworkError::BadResponse(e.to_string())
            }
        })?;
        Ok(ApiReply::from_body(ok, body))
    }

    fn network_error(&self, e: reqwest::Error) -> NetworkError {
        warn!(error = %e, "request failed");
        if e.is_timeout() {
            NetworkError::Timeout(self.timeout)
        } else {
            NetworkError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl SubmitApi for HttpSubmitApi {
    async fn submit(&self, form: &SubmissionForm) -> Result<ApiReply, NetworkError> {
        debug!(endpoint = %self.endpoint, "posting submission");
        let response = self
            .client
            .post(&self.endpoint)
            .json(form)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;
        self.read_reply(response).await
    }
}
