//! Shutdown signal handling.
//!
//! Resolves on SIGTERM (redeploys, `systemctl stop`) or SIGINT / Ctrl+C so
//! the server can drain in-flight requests before exiting.

use tracing::{error, info};

/// Which signal ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

/// Wait for SIGINT or SIGTERM.
///
/// If a handler cannot be installed the corresponding branch never fires;
/// the other one still works.
pub async fn wait_for_shutdown() -> ShutdownSignal {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => ShutdownSignal::Interrupt,
        _ = terminate => ShutdownSignal::Terminate,
    };

    match received {
        ShutdownSignal::Interrupt => info!("received SIGINT (Ctrl+C), shutting down"),
        ShutdownSignal::Terminate => info!("received SIGTERM, draining requests"),
    }
    received
}
