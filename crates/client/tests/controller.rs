//! Submit flow of the form controller, against stub seams and against a
//! live formmailer server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use formmailer_client::{
    ApiReply, ClientConfig, FormController, FormState, FormView, HttpSubmitApi, Messages,
    NetworkError, SubmitApi, SubmitOutcome,
};
use formmailer_core::config::AppConfig;
use formmailer_core::errors::TransportError;
use formmailer_core::models::{Field, SubmissionForm};
use formmailer_core::transport::{MailTransport, OutgoingEmail, SendReceipt};
use formmailer_web::{AppState, WebServer};

// ===========================================================================
// Helpers
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Submitting(bool, String),
    Success(String),
    Error(String),
    Highlight(Field),
    Clear(Field),
    Reset,
}

#[derive(Default)]
struct RecordingView {
    form: SubmissionForm,
    events: Vec<Event>,
}

impl RecordingView {
    fn with(form: SubmissionForm) -> Self {
        Self {
            form,
            events: Vec::new(),
        }
    }

    fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Error(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    fn submitting_events(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Submitting(on, _) => Some(*on),
                _ => None,
            })
            .collect()
    }
}

impl FormView for RecordingView {
    fn read_form(&self) -> SubmissionForm {
        self.form.clone()
    }

    fn set_submitting(&mut self, submitting: bool, label: &str) {
        self.events.push(Event::Submitting(submitting, label.to_string()));
    }

    fn show_success(&mut self, message: &str) {
        self.events.push(Event::Success(message.to_string()));
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(Event::Error(message.to_string()));
    }

    fn highlight_field(&mut self, field: Field) {
        self.events.push(Event::Highlight(field));
    }

    fn clear_field(&mut self, field: Field) {
        self.events.push(Event::Clear(field));
    }

    fn reset(&mut self) {
        self.form = SubmissionForm::default();
        self.events.push(Event::Reset);
    }
}

enum Canned {
    Reply(ApiReply),
    Network,
}

struct StubApi {
    canned: Canned,
    calls: AtomicUsize,
}

impl StubApi {
    fn replying(ok: bool, body: serde_json::Value) -> Self {
        Self {
            canned: Canned::Reply(ApiReply::from_body(ok, body)),
            calls: AtomicUsize::new(0),
        }
    }

    fn unreachable() -> Self {
        Self {
            canned: Canned::Network,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmitApi for StubApi {
    async fn submit(&self, _form: &SubmissionForm) -> Result<ApiReply, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.canned {
            Canned::Reply(reply) => Ok(reply.clone()),
            Canned::Network => Err(NetworkError::Connection("connection refused".into())),
        }
    }
}

fn filled_form() -> SubmissionForm {
    let mut form = SubmissionForm::default();
    form.set(Field::Nom, "Durand");
    form.set(Field::Prenom, "Alice");
    form.set(Field::DestMail, "alice@example.com");
    form.set(Field::Iban, "FR7630006000011234567890189");
    form.set(Field::Swift, "AGRIFRPP");
    form.set(Field::Banque, "Example Bank");
    form.set(Field::Montant, "1500");
    form.set(Field::Libelle, "Rent March");
    form
}

fn controller(
    form: SubmissionForm,
    api: StubApi,
) -> FormController<RecordingView, StubApi> {
    FormController::new(RecordingView::with(form), api, Messages::default())
}

// ===========================================================================
// Client validation
// ===========================================================================

#[tokio::test]
async fn test_empty_name_is_reported_without_a_request() {
    let mut form = filled_form();
    form.set(Field::Nom, "");
    let mut ctl = controller(form, StubApi::replying(true, json!({})));

    let outcome = ctl.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Invalid { .. }));
    assert_eq!(ctl.api().calls(), 0);
    assert_eq!(
        ctl.view().errors(),
        vec!["Last name must be at least 2 characters"]
    );
    assert!(ctl.view().events.contains(&Event::Highlight(Field::Nom)));
    assert!(ctl.view().submitting_events().is_empty());
    assert_eq!(ctl.state(), FormState::Idle);
}

#[tokio::test]
async fn test_every_contact_error_is_reported_at_once() {
    let mut form = filled_form();
    form.set(Field::Nom, "D");
    form.set(Field::Prenom, " ");
    form.set(Field::DestMail, "not-an-email");
    let mut ctl = controller(form, StubApi::replying(true, json!({})));

    match ctl.submit().await {
        SubmitOutcome::Invalid { errors } => assert_eq!(errors.len(), 3),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(ctl.api().calls(), 0);
}

// ===========================================================================
// Server replies
// ===========================================================================

#[tokio::test]
async fn test_accepted_submission_shows_success_and_resets() {
    let api = StubApi::replying(
        true,
        json!({"success": true, "reference": "TRF-20260101-ABC123"}),
    );
    let mut ctl = controller(filled_form(), api);

    let outcome = ctl.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Sent {
            reference: Some("TRF-20260101-ABC123".into())
        }
    );
    assert_eq!(ctl.api().calls(), 1);
    assert_eq!(ctl.view().submitting_events(), vec![true, false]);

    let events = &ctl.view().events;
    assert_eq!(
        events.first(),
        Some(&Event::Submitting(true, "Sending...".into()))
    );
    assert_eq!(
        events.last(),
        Some(&Event::Submitting(false, "Send my request".into()))
    );
    let success = events
        .iter()
        .find_map(|e| match e {
            Event::Success(m) => Some(m.clone()),
            _ => None,
        })
        .expect("success shown");
    assert!(success.contains("alice@example.com"));
    assert!(events.contains(&Event::Reset));
    assert_eq!(ctl.view().form, SubmissionForm::default());
    assert_eq!(ctl.state(), FormState::Idle);
}

#[tokio::test]
async fn test_server_error_message_is_shown() {
    let api = StubApi::replying(
        false,
        json!({"success": false, "error": "Email authentication failed"}),
    );
    let mut ctl = controller(filled_form(), api);

    let outcome = ctl.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            message: "Email authentication failed".into()
        }
    );
    assert_eq!(ctl.view().errors(), vec!["Email authentication failed"]);
    assert_eq!(ctl.view().submitting_events(), vec![true, false]);
    assert!(!ctl.view().events.contains(&Event::Reset));
}

#[tokio::test]
async fn test_server_error_without_message_falls_back_to_generic() {
    let mut ctl = controller(filled_form(), StubApi::replying(false, json!({})));
    ctl.submit().await;
    assert_eq!(
        ctl.view().errors(),
        vec![Messages::default().error_generic.as_str()]
    );
}

#[tokio::test]
async fn test_network_failure_shows_connectivity_message() {
    let mut ctl = controller(filled_form(), StubApi::unreachable());

    assert_eq!(ctl.submit().await, SubmitOutcome::NetworkFailure);
    assert_eq!(
        ctl.view().errors(),
        vec![Messages::default().error_network.as_str()]
    );
    assert_eq!(ctl.view().submitting_events(), vec![true, false]);
    assert_eq!(ctl.state(), FormState::Idle);
}

// ===========================================================================
// Field events
// ===========================================================================

#[tokio::test]
async fn test_blur_checks_email_only() {
    let mut form = filled_form();
    form.set(Field::DestMail, "alice@");
    form.set(Field::Nom, "");
    let mut ctl = controller(form, StubApi::replying(true, json!({})));

    ctl.on_blur(Field::Nom);
    assert!(ctl.view().events.is_empty());

    ctl.on_blur(Field::DestMail);
    assert_eq!(ctl.view().events, vec![Event::Highlight(Field::DestMail)]);
}

#[tokio::test]
async fn test_blur_on_empty_email_does_not_flag() {
    let mut form = filled_form();
    form.set(Field::DestMail, "");
    let mut ctl = controller(form, StubApi::replying(true, json!({})));

    ctl.on_blur(Field::DestMail);
    assert_eq!(ctl.view().events, vec![Event::Clear(Field::DestMail)]);
}

#[tokio::test]
async fn test_input_clears_field_mark() {
    let mut ctl = controller(filled_form(), StubApi::replying(true, json!({})));
    ctl.on_input(Field::Iban);
    assert_eq!(ctl.view().events, vec![Event::Clear(Field::Iban)]);
}

// ===========================================================================
// Over HTTP
// ===========================================================================

struct AcceptingTransport;

#[async_trait]
impl MailTransport for AcceptingTransport {
    async fn verify_connection(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send(&self, _email: OutgoingEmail) -> Result<SendReceipt, TransportError> {
        Ok(SendReceipt {
            message_id: "<live-1@example.com>".into(),
            response: "250 OK".into(),
        })
    }

    fn describe(&self) -> String {
        "accepting:25".into()
    }
}

async fn spawn_server() -> String {
    let mailer: Arc<dyn MailTransport> = Arc::new(AcceptingTransport);
    let state = AppState::new(AppConfig::default(), Some(mailer)).unwrap();
    let app = WebServer::new(state).router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_submits_to_a_live_server() {
    let base = spawn_server().await;
    let api = HttpSubmitApi::new(&ClientConfig::new(base)).unwrap();
    let mut ctl = FormController::new(RecordingView::with(filled_form()), api, Messages::default());

    match ctl.submit().await {
        SubmitOutcome::Sent { reference } => {
            assert!(reference.unwrap().starts_with("TRF-"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn test_live_server_validation_errors_come_back_as_rejections() {
    let base = spawn_server().await;
    let api = HttpSubmitApi::new(&ClientConfig::new(base)).unwrap();

    let mut form = filled_form();
    form.set(Field::Montant, "");
    let reply = api.submit(&form).await.unwrap();

    assert!(!reply.ok);
    assert_eq!(reply.error.as_deref(), Some("All fields are required"));
}

#[tokio::test]
async fn test_status_is_reachable_over_http() {
    let base = spawn_server().await;
    let api = HttpSubmitApi::new(&ClientConfig::new(base)).unwrap();

    let reply = api.get_json("/api/status").await.unwrap();
    assert!(reply.ok);
    assert_eq!(reply.body["status"], "OK");
}

#[tokio::test]
async fn test_status_is_reachable_under_a_send_email_prefix() {
    let mailer: Arc<dyn MailTransport> = Arc::new(AcceptingTransport);
    let state = AppState::new(AppConfig::default(), Some(mailer)).unwrap();
    let app = axum::Router::new().nest("/send-email", WebServer::new(state).router());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = HttpSubmitApi::new(&ClientConfig::new(format!("http://{addr}/send-email"))).unwrap();
    let reply = api.get_json("/api/status").await.unwrap();
    assert!(reply.ok);
    assert_eq!(reply.body["status"], "OK");
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = ClientConfig::new(format!("http://{addr}")).with_timeout(Duration::from_millis(200));
    let api = HttpSubmitApi::new(&config).unwrap();

    let err = api.submit(&filled_form()).await.unwrap_err();
    assert!(matches!(err, NetworkError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_a_connection_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpSubmitApi::new(&ClientConfig::new(format!("http://{addr}"))).unwrap();
    let err = api.submit(&filled_form()).await.unwrap_err();
    assert!(matches!(err, NetworkError::Connection(_)), "got {err:?}");
}
