// Connection handling module
// Serves a single accepted TCP connection on its own task

use crate::handler::ProtocolRouter;
use crate::logger;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::task::JoinSet;

/// Concurrent connection accounting shared by the accept loop and every
/// connection task.
#[derive(Debug, Clone)]
pub struct ConnectionLimit {
    active: Arc<AtomicUsize>,
    max: Option<usize>,
}

impl ConnectionLimit {
    pub fn new(max: Option<u64>) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            max: max.map(|m| usize::try_from(m).unwrap_or(usize::MAX)),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Reserve a slot, or `None` when the limit is reached.
    fn acquire(&self) -> Option<ConnectionSlot> {
        // Increment first, then check, so concurrent acceptors cannot overshoot
        let prev = self.active.fetch_add(1, Ordering::SeqCst);
        if let Some(max) = self.max {
            if prev >= max {
                self.active.fetch_sub(1, Ordering::SeqCst);
                logger::log_warning(&format!(
                    "Max connections reached: {prev}/{max}. Connection rejected."
                ));
                return None;
            }
        }
        Some(ConnectionSlot {
            active: Arc::clone(&self.active),
        })
    }
}

/// Releases its slot when the connection task ends.
struct ConnectionSlot {
    active: Arc<AtomicUsize>,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, checking limits, and serve it on a task in `tasks`.
///
/// Rejected connections are closed immediately without a response.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: &ProtocolRouter,
    limit: &ConnectionLimit,
    tasks: &mut JoinSet<()>,
) {
    let Some(slot) = limit.acquire() else {
        drop(stream);
        return;
    };

    if let Err(e) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY for {peer_addr}: {e}"));
    }

    let router = router.clone();
    tasks.spawn(async move {
        let _slot = slot;
        let io = TokioIo::new(stream);
        let service = service_fn(move |req| {
            let router = router.clone();
            async move { router.dispatch(req, peer_addr).await }
        });

        if let Err(err) = auto::Builder::new(TokioExecutor::new())
            .serve_connection(io, service)
            .await
        {
            logger::log_connection_error(&format!("{peer_addr}: {err}"));
        }
    });
}
