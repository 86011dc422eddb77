//! `submit`: fill in the transfer-request form in the terminal and post it.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

use formmailer_client::{ClientConfig, FormController, FormView, HttpSubmitApi, SubmitOutcome};
use formmailer_core::models::{Field, SubmissionForm};

use crate::style;

/// [`FormView`] on a terminal: messages go to stdout/stderr, the in-flight
/// state is a spinner.
pub struct TerminalView {
    form: SubmissionForm,
    invalid: Vec<Field>,
    spinner: Option<ProgressBar>,
}

impl TerminalView {
    pub fn new(form: SubmissionForm) -> Self {
        Self {
            form,
            invalid: Vec::new(),
            spinner: None,
        }
    }

    /// Fields currently marked as erroneous, in the order they were marked.
    pub fn invalid_fields(&self) -> &[Field] {
        &self.invalid
    }

    /// Prompt for one field, pre-filled with its current value.
    pub fn prompt(&mut self, field: Field) -> Result<()> {
        let value: String = Input::new()
            .with_prompt(prompt_label(field))
            .with_initial_text(self.form.get(field).to_string())
            .allow_empty(true)
            .interact_text()?;
        self.form.set(field, value);
        Ok(())
    }
}

impl FormView for TerminalView {
    fn read_form(&self) -> SubmissionForm {
        self.form.clone()
    }

    fn set_submitting(&mut self, submitting: bool, label: &str) {
        if submitting {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.blue} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
            spinner.set_message(label.to_string());
            spinner.enable_steady_tick(Duration::from_millis(100));
            self.spinner = Some(spinner);
        } else if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn show_success(&mut self, message: &str) {
        println!("{}", style::success(message));
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{}", style::error(message));
    }

    fn highlight_field(&mut self, field: Field) {
        if !self.invalid.contains(&field) {
            self.invalid.push(field);
        }
    }

    fn clear_field(&mut self, field: Field) {
        self.invalid.retain(|f| *f != field);
    }

    fn reset(&mut self) {
        self.form = SubmissionForm::default();
    }
}

/// Run the submit flow. Interactive unless `from_json` is given; with
/// prompts, fields rejected by client validation are asked again.
pub async fn run_submit(config: ClientConfig, from_json: Option<&Path>, yes: bool) -> Result<()> {
    let interactive = from_json.is_none();
    let form = match from_json {
        Some(path) => read_form_file(path)?,
        None => SubmissionForm::default(),
    };

    let api = HttpSubmitApi::new(&config)?;
    let mut controller = FormController::new(TerminalView::new(form), api, config.messages.clone());

    if interactive {
        println!();
        println!("{}", style::header("Transfer request"));
        println!();
        for field in Field::ALL {
            controller.view_mut().prompt(field)?;
            controller.on_input(field);
            controller.on_blur(field);
            if controller.view().invalid_fields().contains(&field) {
                println!("  {}", style::warn("this does not look like an email address"));
            }
        }
    }

    loop {
        if !yes && !confirm(&controller.view().read_form())? {
            println!("{}", style::dim("Nothing sent."));
            return Ok(());
        }

        match controller.submit().await {
            SubmitOutcome::Sent { reference } => {
                if let Some(reference) = reference {
                    println!("  Reference: {}", style::header(&reference));
                }
                return Ok(());
            }
            SubmitOutcome::Invalid { .. } if interactive => {
                let fields = controller.view().invalid_fields().to_vec();
                for field in fields {
                    controller.view_mut().prompt(field)?;
                    controller.on_input(field);
                }
            }
            SubmitOutcome::Invalid { errors } => {
                anyhow::bail!("form is invalid: {}", errors.join(". "))
            }
            SubmitOutcome::Rejected { message } => anyhow::bail!("server rejected the request: {message}"),
            SubmitOutcome::NetworkFailure => anyhow::bail!("request to {} failed", config.api_base_url),
        }
    }
}

fn read_form_file(path: &Path) -> Result<SubmissionForm> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn confirm(form: &SubmissionForm) -> Result<bool> {
    println!();
    for field in Field::ALL {
        println!("  {:<18} {}", prompt_label(field), form.get(field).trim());
    }
    println!();
    Ok(Confirm::new()
        .with_prompt("Send this request?")
        .default(true)
        .interact()?)
}

fn prompt_label(field: Field) -> String {
    let label = field.label();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_label_capitalizes() {
        assert_eq!(prompt_label(Field::Nom), "Last name");
        assert_eq!(prompt_label(Field::Iban), "IBAN");
    }

    #[test]
    fn test_view_tracks_marked_fields() {
        let mut view = TerminalView::new(SubmissionForm::default());
        view.highlight_field(Field::Nom);
        view.highlight_field(Field::DestMail);
        view.highlight_field(Field::Nom);
        assert_eq!(view.invalid_fields(), &[Field::Nom, Field::DestMail]);

        view.clear_field(Field::Nom);
        assert_eq!(view.invalid_fields(), &[Field::DestMail]);
    }

    #[test]
    fn test_reset_empties_form() {
        let mut form = SubmissionForm::default();
        form.set(Field::Nom, "Durand");
        let mut view = TerminalView::new(form);
        view.reset();
        assert_eq!(view.read_form(), SubmissionForm::default());
    }

    #[test]
    fn test_read_form_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"nom": "Durand", "dest_mail": "a@b.co"}"#).unwrap();

        let form = read_form_file(&path).unwrap();
        assert_eq!(form.get(Field::Nom), "Durand");
        assert_eq!(form.get(Field::DestMail), "a@b.co");
        assert_eq!(form.get(Field::Iban), "");
    }
}
