// Accept loop
// Runs until the shutdown future resolves, then drains in-flight connections

use super::connection::{accept_connection, ConnectionLimit};
use crate::handler::ProtocolRouter;
use crate::logger;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// After shutdown no new connections are accepted; the call returns once
/// every connection already accepted has finished.
pub async fn serve<F>(
    listener: TcpListener,
    router: ProtocolRouter,
    max_connections: Option<u64>,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    let limit = ConnectionLimit::new(max_connections);
    let mut tasks = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                logger::log_info(&format!(
                    "Stopped accepting connections, draining {} in flight",
                    limit.active()
                ));
                break;
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &router, &limit, &mut tasks);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            // Reap finished connection tasks
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    while tasks.join_next().await.is_some() {}
    logger::log_info("Server stopped");
}
