//! Access logging middleware.
//!
//! Times the downstream handler and emits one formatted line per request
//! onto an [`AccessSink`]. Writing happens on a separate task (see
//! [`crate::logger::spawn_access_writer`]), so log I/O never delays a
//! response, and a closed sink is silently ignored.

use super::{handler_fn, BoxedHandler, Middleware, RequestId};
use crate::logger::AccessLogEntry;
use hyper::body::Body as _;
use hyper::{Request, Version};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Sending half of the access log channel.
pub type AccessSink = mpsc::UnboundedSender<String>;

/// Peer address of the connection a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// Access log middleware.
pub struct AccessLog {
    format: Arc<str>,
    sink: AccessSink,
}

impl AccessLog {
    pub fn new(format: &str, sink: AccessSink) -> Self {
        Self {
            format: Arc::from(format),
            sink,
        }
    }
}

impl Middleware for AccessLog {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let format = Arc::clone(&self.format);
        let sink = self.sink.clone();
        handler_fn(move |req| {
            let started = Instant::now();
            let mut entry = entry_for(&req);
            let next = Arc::clone(&next);
            let format = Arc::clone(&format);
            let sink = sink.clone();

            async move {
                let resp = next.call(req).await;

                entry.status = resp.status().as_u16();
                entry.body_bytes = resp.body().size_hint().exact();
                entry.request_time_us =
                    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
                // The writer task may be gone during shutdown; dropping the line is fine.
                let _ = sink.send(entry.format(&format));

                resp
            }
        })
    }
}

fn entry_for<B>(req: &Request<B>) -> AccessLogEntry {
    let remote_addr = req
        .extensions()
        .get::<RemoteAddr>()
        .map_or_else(|| "-".to_string(), |a| a.0.ip().to_string());
    let mut entry = AccessLogEntry::new(
        remote_addr,
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header(req, "referer");
    entry.user_agent = header(req, "user-agent");
    entry.request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());
    entry
}

fn header<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}
