//! Error types for the formmailer core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

use crate::models::Field;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// An environment variable holds a value of the wrong shape.
    #[error("invalid value '{value}' in environment variable '{var}': {detail}")]
    InvalidEnvVar {
        var: String,
        value: String,
        detail: String,
    },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Why a submitted form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are absent or blank.
    #[error("missing required fields: {}", labels(.fields))]
    Missing { fields: Vec<Field> },

    /// All fields are present but some values are malformed.
    #[error("{}", .errors.join(". "))]
    Invalid { errors: Vec<String> },
}

fn labels(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

/// Errors from the email template renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A bundled template failed to compile.
    #[error("failed to load template '{name}': {detail}")]
    TemplateLoad { name: String, detail: String },

    /// Rendering a template against a submission failed.
    #[error("failed to render template '{name}': {detail}")]
    Render { name: String, detail: String },
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Errors from the mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The SMTP server rejected the credentials.
    #[error("SMTP authentication failed: {0}")]
    Auth(String),

    /// The SMTP server could not be reached.
    #[error("SMTP connection failed: {0}")]
    Connection(String),

    /// The SMTP exchange timed out.
    #[error("SMTP timeout: {0}")]
    Timeout(String),

    /// The SMTP server answered with a non-auth error reply.
    #[error("SMTP server rejected the message: {0}")]
    Rejected(String),

    /// The message could not be built (bad address, header, ...).
    #[error("invalid email message: {0}")]
    InvalidMessage(String),

    /// The transport could not be constructed from configuration.
    #[error("email transport unavailable: {0}")]
    Unavailable(String),
}
