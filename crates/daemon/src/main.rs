//! formmailer server entry point.
//!
//! Loads configuration, builds the SMTP mailer and email renderer, serves
//! the API and static site, and shuts down gracefully on SIGTERM/SIGINT.

mod signals;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use formmailer_core::config::AppConfig;
use formmailer_core::transport::{MailTransport, SmtpMailer};
use formmailer_web::{AppState, WebServer};

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// formmailer HTTP server.
#[derive(Parser, Debug)]
#[command(
    name = "formmailer-daemon",
    version,
    about = "Serve the transfer-request form and email confirmations"
)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the static site directory.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_ref()).context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.static_dir {
        config.server.static_dir = dir;
    }
    config
        .validate()
        .context("configuration validation failed")?;

    // Initialize tracing
    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.server.log_level);

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    // Startup banner
    info!("========================================");
    info!("  formmailer v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");
    match args.config.as_ref() {
        Some(path) => info!("Config file   : {}", path.display()),
        None => info!("Config file   : (none, defaults + environment)"),
    }
    info!("Listen        : {}", config.server.listen_addr());
    info!("Static dir    : {}", config.server.static_dir.display());
    info!(
        "CORS origin   : {}",
        config.server.cors_origin.as_deref().unwrap_or("*")
    );
    info!(
        "SMTP server   : {}:{} ({})",
        config.smtp.host,
        config.smtp.port,
        config.smtp.effective_tls()
    );
    info!("SMTP user     : {}", config.smtp.username);
    info!(
        "SMTP password : {}",
        if config.smtp.password.is_some() { "set" } else { "NOT SET" }
    );
    info!("Log level     : {}", log_level);
    info!("========================================");

    if !config.server.static_dir.is_dir() {
        warn!(
            dir = %config.server.static_dir.display(),
            "static directory does not exist, only the API will be served"
        );
    }

    // Initialize mail transport. Without one the server still starts and
    // /send-email answers 503.
    let mailer: Option<Arc<dyn MailTransport>> = match SmtpMailer::from_config(&config) {
        Ok(mailer) => Some(Arc::new(mailer)),
        Err(e) => {
            warn!(error = %e, "email sending disabled");
            None
        }
    };

    let state = AppState::new(config, mailer).context("failed to compile email templates")?;
    let server = WebServer::new(state);

    server
        .start(async {
            signals::wait_for_shutdown().await;
        })
        .await
        .context("web server failed")?;

    info!("formmailer stopped.");
    Ok(())
}
