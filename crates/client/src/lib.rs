//! Client side of the transfer-request form.
//!
//! The [`FormController`] owns the submit flow (client validation, request
//! with timeout, success/error feedback) and talks to the outside world only
//! through two injected seams: a [`FormView`] for everything the user sees
//! and a [`SubmitApi`] for the network. [`NavMenu`] holds the mobile
//! navigation menu state shared by every page.

pub mod api;
pub mod controller;
pub mod nav;
pub mod view;

use std::time::Duration;

pub use api::{ApiReply, HttpSubmitApi, NetworkError, SubmitApi};
pub use controller::{FormController, FormState, SubmitOutcome};
pub use nav::NavMenu;
pub use view::FormView;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the formmailer API, without trailing slash.
    pub api_base_url: String,
    /// Requests not answered within this delay are aborted.
    pub request_timeout: Duration,
    pub messages: Messages,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            messages: Messages::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

/// User-facing texts.
#[derive(Debug, Clone)]
pub struct Messages {
    pub submit_label: String,
    pub loading: String,
    pub success: String,
    pub error_network: String,
    pub error_generic: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            submit_label: "Send my request".into(),
            loading: "Sending...".into(),
            success: "Confirmation email sent successfully!".into(),
            error_network: "Unable to reach the server. Check your internet connection.".into(),
            error_generic: "An error occurred. Please try again.".into(),
        }
    }
}
