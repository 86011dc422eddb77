//! formmailer core library.
//!
//! This crate provides the building blocks of the transfer-request form
//! pipeline: configuration, field validation, reference generation, email
//! rendering, and the SMTP mail transport.

pub mod config;
pub mod errors;
pub mod models;
pub mod reference;
pub mod render;
pub mod transport;
pub mod validate;

// Re-exports for convenience.
pub use config::AppConfig;
pub use models::{Field, Reference, Submission, SubmissionForm};
pub use render::{EmailRenderer, RenderedEmail};
pub use transport::{MailTransport, OutgoingEmail, SendReceipt, SmtpMailer};
