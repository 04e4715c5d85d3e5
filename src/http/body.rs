//! Body types shared by every handler in the server.
//!
//! Requests and responses are boxed so that the WebDAV engine, the static
//! asset responder and the middleware layers can all be stored behind the
//! same handler trait object.

use http_body_util::combinators::{BoxBody, UnsyncBoxBody};
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Bytes, Incoming};
use std::io;

/// Request body seen by handlers.
pub type RequestBody = BoxBody<Bytes, io::Error>;

/// Response body produced by handlers.
///
/// Unsync because the WebDAV engine streams file contents through a
/// `Send`-only stream.
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Box an incoming hyper body into a [`RequestBody`].
pub fn from_incoming(body: Incoming) -> RequestBody {
    body.map_err(io::Error::other).boxed()
}

/// Response body holding `data` in full.
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty response body.
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

#[cfg(test)]
pub mod testing {
    use super::{RequestBody, ResponseBody};
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;

    /// Request body for in-process tests.
    pub fn request_body(data: impl Into<Bytes>) -> RequestBody {
        Full::new(data.into())
            .map_err(|never| match never {})
            .boxed()
    }

    /// Collect a response body into bytes.
    pub async fn collect(body: ResponseBody) -> Bytes {
        body.collect()
            .await
            .expect("response body should be readable")
            .to_bytes()
    }
}
