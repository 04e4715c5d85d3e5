//! WebDAV protocol handler
//!
//! Thin adapter around [`dav_server::DavHandler`]: the engine owns the
//! protocol (locking, properties, file I/O); this module only mounts it under
//! the configured prefix and reports engine errors (server errors, lock and
//! precondition conflicts) to an error sink, the error log by default.

use crate::http::{RequestBody, ResponseBody};
use crate::logger;
use crate::middleware::{BoxFuture, Handler};
use dav_server::localfs::LocalFs;
use dav_server::memls::MemLs;
use dav_server::DavHandler;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use std::path::Path;
use std::sync::Arc;

/// Receives `(method, path, status)` for every engine error response.
pub type ErrorSink = Arc<dyn Fn(&str, &str, StatusCode) + Send + Sync>;

/// WebDAV engine serving one directory under one URL prefix.
#[derive(Clone)]
pub struct WebDav {
    dav: DavHandler,
    on_error: ErrorSink,
}

impl WebDav {
    /// `prefix` is the normalised mount point (`/webdav/`); the engine sees
    /// paths relative to it. Engine errors go to the error log.
    pub fn new(prefix: &str, root: &Path) -> Self {
        Self::with_error_sink(
            prefix,
            root,
            Arc::new(|method: &str, path: &str, status: StatusCode| {
                logger::log_webdav_error(method, path, status.as_u16());
            }),
        )
    }

    pub fn with_error_sink(prefix: &str, root: &Path, on_error: ErrorSink) -> Self {
        let dav = DavHandler::builder()
            .strip_prefix(prefix.trim_end_matches('/'))
            .filesystem(LocalFs::new(root, false, false, false))
            .locksystem(MemLs::new())
            .build_handler();
        Self { dav, on_error }
    }
}

/// Statuses the engine uses to report a failed operation rather than a
/// client mistake: server errors plus lock and precondition conflicts.
pub fn is_engine_error(status: StatusCode) -> bool {
    status.is_server_error()
        || matches!(
            status,
            StatusCode::CONFLICT
                | StatusCode::PRECONDITION_FAILED
                | StatusCode::LOCKED
                | StatusCode::FAILED_DEPENDENCY
        )
}

impl Handler for WebDav {
    fn call(&self, req: Request<RequestBody>) -> BoxFuture {
        let dav = self.dav.clone();
        let on_error = Arc::clone(&self.on_error);
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        Box::pin(async move {
            let resp = dav.handle(req).await;
            if is_engine_error(resp.status()) {
                on_error(&method, &path, resp.status());
            }
            resp.map(|body| -> ResponseBody { body.boxed_unsync() })
        })
    }
}
