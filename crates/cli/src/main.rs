//! formmailer command-line tool.
//!
//! Talks to a running formmailer server (status, SMTP check, interactive
//! form submission) and generates or validates server configuration files.

mod commands;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formmailer_client::ClientConfig;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// formmailer command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "formmailer",
    version,
    about = "Submit transfer requests to and inspect a formmailer server"
)]
struct Cli {
    /// Base URL of the formmailer server.
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    api_url: String,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value = "10")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show server status.
    Status {
        /// Print the raw JSON reply.
        #[arg(long)]
        json: bool,
    },

    /// Ask the server to check its SMTP connection.
    TestEmail,

    /// Fill in and submit a transfer request.
    Submit {
        /// Read field values from a JSON file instead of prompting.
        #[arg(long)]
        from_json: Option<PathBuf>,

        /// Submit without asking for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate a default server configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./formmailer.toml")]
        output: PathBuf,
    },

    /// Validate a server configuration file.
    Validate {
        /// Path to the TOML configuration file.
        #[arg(short, long, default_value = "./formmailer.toml")]
        config: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    // Minimal logging for CLI
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style::error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client_config =
        ClientConfig::new(cli.api_url).with_timeout(Duration::from_secs(cli.timeout));

    match cli.command {
        Commands::Status { json } => commands::status::run_status(&client_config, json).await,
        Commands::TestEmail => commands::status::run_test_email(&client_config).await,
        Commands::Submit { from_json, yes } => {
            commands::submit::run_submit(client_config, from_json.as_deref(), yes).await
        }
        Commands::Init { output } => commands::config::run_init(&output),
        Commands::Validate { config } => commands::config::run_validate(&config),
    }
}
