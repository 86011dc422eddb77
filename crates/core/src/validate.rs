//! Field validation shared by the server and the client form controller.
//!
//! All functions here are pure. The server runs [`validate_submission`]
//! (presence of every field, then value checks); the client runs the lighter
//! [`validate_contact`] before issuing a request.

use std::sync::OnceLock;

use lettre::message::Mailbox;
use lettre::Address;
use regex_lite::Regex;

use crate::errors::ValidationError;
use crate::models::{Field, Submission, SubmissionForm};

/// Minimum length of the name fields, in characters.
pub const MIN_NAME_LEN: usize = 2;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Email check: the `local@domain.tld` shape without whitespace, and an
/// address the mail builder accepts as a recipient.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    email_regex().is_match(email)
        && email.parse::<Address>().is_ok()
        && email.parse::<Mailbox>().is_ok()
}

/// Whether `text`, once trimmed, has at least `min` characters.
pub fn is_valid_length(text: &str, min: usize) -> bool {
    text.trim().chars().count() >= min
}

/// Fields that are absent or blank after trimming.
pub fn missing_fields(form: &SubmissionForm) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|f| form.get(*f).trim().is_empty())
        .collect()
}

/// Outcome of the value checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Human-readable messages, one per failed check.
    pub errors: Vec<String>,
    /// Fields that failed a check, for highlighting.
    pub invalid_fields: Vec<Field>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn reject(&mut self, field: Field, message: &str) {
        self.errors.push(message.to_string());
        self.invalid_fields.push(field);
    }
}

/// Value checks on the contact part of the form: name lengths and email
/// shape. Other fields are not inspected.
pub fn validate_contact(form: &SubmissionForm) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !is_valid_length(form.get(Field::Nom), MIN_NAME_LEN) {
        report.reject(Field::Nom, "Last name must be at least 2 characters");
    }
    if !is_valid_length(form.get(Field::Prenom), MIN_NAME_LEN) {
        report.reject(Field::Prenom, "First name must be at least 2 characters");
    }
    if !is_valid_email(form.get(Field::DestMail)) {
        report.reject(Field::DestMail, "Please enter a valid email address");
    }

    report
}

/// Full server-side validation.
///
/// Missing fields are reported before value errors, so a form with a blank
/// `dest_mail` yields [`ValidationError::Missing`] rather than an invalid
/// email.
pub fn validate_submission(form: SubmissionForm) -> Result<Submission, ValidationError> {
    let form = form.trimmed();

    let missing = missing_fields(&form);
    if !missing.is_empty() {
        return Err(ValidationError::Missing { fields: missing });
    }

    let report = validate_contact(&form);
    if !report.is_valid() {
        return Err(ValidationError::Invalid {
            errors: report.errors,
        });
    }

    Ok(Submission::from_trimmed(&form))
}
