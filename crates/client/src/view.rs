//! View seam of the form controller.

use formmailer_core::models::{Field, SubmissionForm};

/// Everything the controller needs from the page (or terminal) hosting the
/// form.
pub trait FormView {
    /// Current raw field values.
    fn read_form(&self) -> SubmissionForm;

    /// Disable the submit button and swap its label while a request is in
    /// flight, restore both afterwards.
    fn set_submitting(&mut self, submitting: bool, label: &str);

    fn show_success(&mut self, message: &str);

    fn show_error(&mut self, message: &str);

    /// Mark a field as erroneous.
    fn highlight_field(&mut self, field: Field);

    /// Remove the error mark from a field.
    fn clear_field(&mut self, field: Field);

    /// Empty every field.
    fn reset(&mut self);
}
