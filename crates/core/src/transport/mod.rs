//! Outgoing mail transport.
//!
//! The HTTP layer talks to a [`MailTransport`] trait object so that the SMTP
//! implementation ([`smtp::SmtpMailer`]) can be swapped for a stub in tests.

pub mod smtp;

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::render::RenderedEmail;

pub use smtp::SmtpMailer;

/// A fully rendered message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, rendered: RenderedEmail) -> Self {
        Self {
            to: to.into(),
            subject: rendered.subject,
            html: rendered.html,
            text: rendered.text,
        }
    }
}

/// Receipt for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// `Message-ID` of the sent message.
    pub message_id: String,
    /// Server reply, for logging.
    pub response: String,
}

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Open a connection and check that the server accepts us, without
    /// sending anything.
    async fn verify_connection(&self) -> Result<(), TransportError>;

    /// Deliver one message.
    async fn send(&self, email: OutgoingEmail) -> Result<SendReceipt, TransportError>;

    /// Short human description (`host:port`) for status output.
    fn describe(&self) -> String;
}
