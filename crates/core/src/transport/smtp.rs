//! SMTP transport backed by `lettre`.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{MailTransport, OutgoingEmail, SendReceipt};
use crate::config::{AppConfig, TlsMode};
use crate::errors::TransportError;

/// SMTP reply codes that mean the credentials were refused.
const AUTH_REPLY_CODES: [&str; 4] = ["530", "534", "535", "538"];

/// SMTP mailer built once at startup and shared across requests.
///
/// The underlying transport keeps its own connection pool.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    sender_domain: String,
    host: String,
    port: u16,
}

impl SmtpMailer {
    /// Build a mailer from the SMTP and mail sections of the configuration.
    ///
    /// Fails with [`TransportError::Unavailable`] when no password is
    /// configured or the relay/sender cannot be set up.
    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        let smtp = &config.smtp;

        let password = smtp.password.as_deref().ok_or_else(|| {
            TransportError::Unavailable(format!(
                "SMTP password not set (environment variable {})",
                smtp.password_env
            ))
        })?;

        let address: Address = smtp.username.parse().map_err(|e| {
            TransportError::Unavailable(format!("invalid sender '{}': {}", smtp.username, e))
        })?;
        let from = Mailbox::new(Some(config.mail.from_name.clone()), address);

        let creds = Credentials::new(smtp.username.clone(), password.to_string());
        let tls = smtp.effective_tls();

        let builder = match tls {
            TlsMode::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                .map_err(|e| {
                    TransportError::Unavailable(format!("SMTP relay setup failed: {}", e))
                })?,
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host).map_err(
                |e| TransportError::Unavailable(format!("SMTP relay setup failed: {}", e)),
            )?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host),
        };

        let transport = builder
            .port(smtp.port)
            .credentials(creds)
            .timeout(Some(Duration::from_secs(smtp.timeout_secs)))
            .build();

        info!(
            host = %smtp.host,
            port = smtp.port,
            tls = %tls,
            from = %from,
            "initializing SMTP mailer"
        );

        Ok(Self {
            transport,
            from,
            sender_domain: smtp.sender_domain().to_string(),
            host: smtp.host.clone(),
            port: smtp.port,
        })
    }

    fn build_message(&self, email: &OutgoingEmail, message_id: &str) -> Result<Message, TransportError> {
        let to: Mailbox = email.to.parse().map_err(|e| {
            TransportError::InvalidMessage(format!("invalid recipient '{}': {}", email.to, e))
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .message_id(Some(message_id.to_string()))
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| TransportError::InvalidMessage(format!("failed to build email: {}", e)))
    }

    fn new_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.sender_domain)
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn verify_connection(&self) -> Result<(), TransportError> {
        debug!(host = %self.host, port = self.port, "verifying SMTP connection");
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(TransportError::Connection(format!(
                "no session could be opened with {}:{}",
                self.host, self.port
            ))),
            Err(e) => Err(classify(&e)),
        }
    }

    async fn send(&self, email: OutgoingEmail) -> Result<SendReceipt, TransportError> {
        let message_id = self.new_message_id();
        let message = self.build_message(&email, &message_id)?;

        debug!(to = %email.to, subject = %email.subject, "sending email");
        match self.transport.send(message).await {
            Ok(response) => {
                let reply = format!(
                    "{} {}",
                    response.code(),
                    response.message().collect::<Vec<_>>().join(" ")
                );
                info!(to = %email.to, message_id = %message_id, "email sent successfully");
                Ok(SendReceipt {
                    message_id,
                    response: reply,
                })
            }
            Err(e) => {
                warn!(to = %email.to, error = %e, "failed to send email");
                Err(classify(&e))
            }
        }
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Map a lettre SMTP error onto the transport error taxonomy.
fn classify(err: &lettre::transport::smtp::Error) -> TransportError {
    classify_parts(
        err.status().map(|code| code.to_string()),
        err.is_timeout(),
        err.to_string(),
    )
}

fn classify_parts(reply_code: Option<String>, timed_out: bool, detail: String) -> TransportError {
    if timed_out {
        return TransportError::Timeout(detail);
    }
    match reply_code {
        Some(code) if AUTH_REPLY_CODES.contains(&code.as_str()) => TransportError::Auth(detail),
        Some(_) => TransportError::Rejected(detail),
        None => TransportError::Connection(detail),
    }
}
