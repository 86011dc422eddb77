//! Submit flow of the transfer-request form.
//!
//! ```text
//! Idle --submit--> Submitting --reply--> Succeeded | Failed --> Idle
//!   \--invalid input (no request)--> Idle
//! ```

use tracing::{debug, info, warn};

use formmailer_core::models::Field;
use formmailer_core::validate::{is_valid_email, validate_contact};

use crate::api::SubmitApi;
use crate::view::FormView;
use crate::Messages;

/// Controller state. `Succeeded` and `Failed` are transient: the controller
/// is back to `Idle` once [`FormController::submit`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// What a call to [`FormController::submit`] ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Client validation failed; no request was made.
    Invalid { errors: Vec<String> },
    /// The server accepted the submission.
    Sent { reference: Option<String> },
    /// The server answered with an error.
    Rejected { message: String },
    /// No usable answer (timeout, connection, unreadable body).
    NetworkFailure,
}

pub struct FormController<V, A> {
    view: V,
    api: A,
    messages: Messages,
    state: FormState,
}

impl<V: FormView, A: SubmitApi> FormController<V, A> {
    pub fn new(view: V, api: A, messages: Messages) -> Self {
        Self {
            view,
            api,
            messages,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Handle a submit: validate locally, post, report back through the view.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let form = self.view.read_form().trimmed();

        let report = validate_contact(&form);
        if !report.is_valid() {
            debug!(errors = ?report.errors, "client validation failed");
            self.view.show_error(&report.errors.join(". "));
            for field in &report.invalid_fields {
                self.view.highlight_field(*field);
            }
            return SubmitOutcome::Invalid {
                errors: report.errors,
            };
        }

        self.transition(FormState::Submitting);
        self.view.set_submitting(true, &self.messages.loading);

        let result = self.api.submit(&form).await;
        let outcome = match result {
            Ok(reply) if reply.ok => {
                info!(reference = ?reply.reference(), "submission accepted");
                let message = format!(
                    "{} Check your inbox at {}.",
                    self.messages.success,
                    form.get(Field::DestMail)
                );
                self.view.show_success(&message);
                self.reset_form();
                self.transition(FormState::Succeeded);
                SubmitOutcome::Sent {
                    reference: reply.reference().map(str::to_string),
                }
            }
            Ok(reply) => {
                let message = reply
                    .error
                    .unwrap_or_else(|| self.messages.error_generic.clone());
                warn!(error = %message, "submission rejected by server");
                self.view.show_error(&message);
                self.transition(FormState::Failed);
                SubmitOutcome::Rejected { message }
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.view.show_error(&self.messages.error_network);
                self.transition(FormState::Failed);
                SubmitOutcome::NetworkFailure
            }
        };

        self.view.set_submitting(false, &self.messages.submit_label);
        self.transition(FormState::Idle);
        outcome
    }

    /// Typing into a field clears its error mark.
    pub fn on_input(&mut self, field: Field) {
        self.view.clear_field(field);
    }

    /// Leaving a field re-checks it. Only the email field is checked; an
    /// empty value is not flagged until submit.
    pub fn on_blur(&mut self, field: Field) {
        if field != Field::DestMail {
            return;
        }
        let form = self.view.read_form();
        let email = form.get(Field::DestMail).trim();
        if !email.is_empty() && !is_valid_email(email) {
            self.view.highlight_field(Field::DestMail);
        } else {
            self.view.clear_field(Field::DestMail);
        }
    }

    fn reset_form(&mut self) {
        self.view.reset();
        for field in Field::ALL {
            self.view.clear_field(field);
        }
    }

    fn transition(&mut self, next: FormState) {
        debug!(from = ?self.state, to = ?next, "form state");
        self.state = next;
    }
}
