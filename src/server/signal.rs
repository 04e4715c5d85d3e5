// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use crate::logger;

/// Resolve once the process is asked to stop.
///
/// If a handler cannot be registered the failure is logged and that signal is
/// simply never observed.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
                std::future::pending::<()>().await;
            }
        }
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_warning(&format!("Failed to register SIGINT handler: {e}"));
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = terminate => logger::log_info("SIGTERM received, shutting down"),
        () = interrupt => logger::log_info("SIGINT received, shutting down"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_info("Ctrl+C received, shutting down"),
        Err(e) => {
            logger::log_warning(&format!("Failed to register Ctrl+C handler: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
