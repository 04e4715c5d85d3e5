//! Middleware layer.
//!
//! A [`Handler`] turns a request into a response. A [`Middleware`] wraps a
//! handler and returns a new one. A [`Chain`] is an immutable, ordered list
//! of middleware that can be folded onto any base handler:
//!
//! ```text
//! Chain::default().with(a).with(b).with(c).apply(base)  ==  c(b(a(base)))
//! ```
//!
//! so the last-registered middleware sees the request first and the response
//! last. The chain is built once at startup and shared across every
//! connection; nothing in it is mutated afterwards.

pub mod access_log;
pub mod auth;
pub mod cors;
pub mod request_id;

use crate::http::{RequestBody, ResponseBody};
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use access_log::AccessLog;
pub use auth::{BasicAuth, CredentialSet};
pub use cors::{Cors, CorsPolicy};
pub use request_id::{RequestId, RequestTagger};

/// Type-erased response future.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response<ResponseBody>> + Send + 'static>>;

/// Something that can answer a request.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request<RequestBody>) -> BoxFuture;
}

/// Shared handler, cloned once per request.
pub type BoxedHandler = Arc<dyn Handler>;

/// Wraps a handler in another handler.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

/// Ordered, immutable middleware list.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    /// Return a new chain with `layer` registered after the existing ones.
    #[must_use]
    pub fn with(&self, layer: impl Middleware) -> Self {
        let mut layers = self.layers.clone();
        layers.push(Arc::new(layer));
        Self { layers }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wrap `base` with every layer, first-registered innermost.
    ///
    /// `base` itself is left untouched; each call builds a fresh handler.
    pub fn apply(&self, base: BoxedHandler) -> BoxedHandler {
        self.layers
            .iter()
            .fold(base, |inner, layer| layer.wrap(inner))
    }
}

struct FnHandler<F>(F);

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Request<RequestBody>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<ResponseBody>> + Send + 'static,
{
    fn call(&self, req: Request<RequestBody>) -> BoxFuture {
        Box::pin((self.0)(req))
    }
}

/// Lift an async function or closure into a [`BoxedHandler`].
pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Request<RequestBody>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<ResponseBody>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{handler_fn, BoxedHandler};
    use crate::http::body;
    use hyper::Response;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Terminal handler that counts invocations and answers 200 "ok".
    pub fn counting_handler() -> (BoxedHandler, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handler = handler_fn(move |_req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Response::new(body::full("ok")) }
        });
        (handler, hits)
    }
}
