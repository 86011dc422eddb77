//! formmailer web server and REST API.
//!
//! Provides an Axum-based HTTP server with:
//! - Status endpoint
//! - SMTP connectivity check
//! - Transfer-request submission endpoint
//! - Static file serving for the site itself

pub mod api;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use formmailer_core::config::AppConfig;
use formmailer_core::errors::RenderError;
use formmailer_core::render::EmailRenderer;
use formmailer_core::transport::MailTransport;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub config: AppConfig,
    /// `None` when the transport could not be configured at startup.
    pub mailer: Option<Arc<dyn MailTransport>>,
    pub renderer: EmailRenderer,
    pub started_at: Instant,
}

impl AppState {
    /// Build the state, compiling the email templates.
    pub fn new(
        config: AppConfig,
        mailer: Option<Arc<dyn MailTransport>>,
    ) -> Result<Self, RenderError> {
        let renderer = EmailRenderer::new(config.mail.from_name.clone())?;
        Ok(Self {
            config,
            mailer,
            renderer,
            started_at: Instant::now(),
        })
    }
}

/// The web server.
pub struct WebServer {
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server around the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the full router: API routes, static fallback, middleware.
    pub fn router(&self) -> Router {
        let static_files = ServeDir::new(&self.state.config.server.static_dir);

        Router::new()
            .merge(api::status::routes())
            .merge(api::email::routes())
            .fallback_service(static_files)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
            .layer(self.cors_layer())
            .with_state(self.state.clone())
    }

    fn cors_layer(&self) -> CorsLayer {
        let origin = match self.state.config.server.cors_origin.as_deref() {
            Some(origin) => match HeaderValue::from_str(origin) {
                Ok(value) => AllowOrigin::exact(value),
                Err(e) => {
                    warn!(origin, error = %e, "invalid CORS origin, allowing any origin");
                    AllowOrigin::from(Any)
                }
            },
            None => AllowOrigin::from(Any),
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }

    /// Start the web server and serve until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self.state.config.server.listen_addr().parse()?;
        let app = self.router();

        info!(
            addr = %addr,
            static_dir = %self.state.config.server.static_dir.display(),
            "starting web server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("web server stopped");
        Ok(())
    }
}
