//! Per-request correlation identifiers.

use super::{handler_fn, BoxedHandler, Middleware};
use hyper::header::HeaderValue;
use std::fmt;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tags every request with a fresh [`RequestId`] and echoes it in the
/// `X-Request-Id` response header.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestTagger;

impl Middleware for RequestTagger {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        handler_fn(move |mut req| {
            let id = RequestId::generate();
            // A UUID is always valid header text.
            let value = HeaderValue::from_str(id.as_str()).ok();
            if let Some(v) = &value {
                req.headers_mut().insert(REQUEST_ID_HEADER, v.clone());
            }
            req.extensions_mut().insert(id);

            let next = std::sync::Arc::clone(&next);
            async move {
                let mut resp = next.call(req).await;
                if let Some(v) = value {
                    resp.headers_mut().insert(REQUEST_ID_HEADER, v);
                }
                resp
            }
        })
    }
}
