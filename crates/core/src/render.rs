//! Confirmation email rendering.
//!
//! Templates are bundled into the binary and compiled once. Template names
//! ending in `.html` are auto-escaped by minijinja, so submitted values can
//! never inject markup into the HTML body. The plain-text body is left
//! unescaped.

use chrono::{DateTime, Datelike, Utc};
use minijinja::{context, Environment};
use tracing::debug;

use crate::errors::RenderError;
use crate::models::{Reference, Submission};

const HTML_TEMPLATE: &str = "transfer_confirmation.html";
const TEXT_TEMPLATE: &str = "transfer_confirmation.txt";

/// A rendered confirmation email, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Renders confirmation emails from the bundled templates.
pub struct EmailRenderer {
    env: Environment<'static>,
    from_name: String,
}

impl EmailRenderer {
    /// Compile the bundled templates.
    pub fn new(from_name: impl Into<String>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        for (name, source) in [
            (
                HTML_TEMPLATE,
                include_str!("../templates/transfer_confirmation.html"),
            ),
            (
                TEXT_TEMPLATE,
                include_str!("../templates/transfer_confirmation.txt"),
            ),
        ] {
            env.add_template(name, source)
                .map_err(|e| RenderError::TemplateLoad {
                    name: name.into(),
                    detail: e.to_string(),
                })?;
        }

        Ok(Self {
            env,
            from_name: from_name.into(),
        })
    }

    /// Render subject, HTML body and text body for one submission.
    pub fn render(
        &self,
        submission: &Submission,
        reference: &Reference,
        submitted_at: DateTime<Utc>,
    ) -> Result<RenderedEmail, RenderError> {
        let ctx = context! {
            submission => submission,
            reference => reference.as_str(),
            submitted_at => submitted_at.format("%d %B %Y, %H:%M UTC").to_string(),
            year => submitted_at.year(),
            from_name => &self.from_name,
        };

        let html = self.render_one(HTML_TEMPLATE, &ctx)?;
        let text = self.render_one(TEXT_TEMPLATE, &ctx)?;
        debug!(%reference, html_len = html.len(), text_len = text.len(), "rendered confirmation email");

        Ok(RenderedEmail {
            subject: subject_for(reference),
            html,
            text,
        })
    }

    fn render_one(&self, name: &str, ctx: &minijinja::Value) -> Result<String, RenderError> {
        let to_err = |e: minijinja::Error| RenderError::Render {
            name: name.into(),
            detail: e.to_string(),
        };
        self.env
            .get_template(name)
            .map_err(to_err)?
            .render(ctx)
            .map_err(to_err)
    }
}

/// Subject line of the confirmation email.
pub fn subject_for(reference: &Reference) -> String {
    format!("Transfer request received [{}]", reference)
}
