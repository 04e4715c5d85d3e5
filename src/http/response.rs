//! HTTP response building module
//!
//! Builders for the fixed-status responses the server emits itself. WebDAV
//! responses come from the protocol engine and never pass through here.

use super::body::{self, ResponseBody};
use super::range::ByteRange;
use hyper::body::Bytes;
use hyper::Response;

/// Response headers describing a served asset.
pub struct AssetHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
    pub cache_control: &'a str,
}

/// Build 200 response carrying a whole asset
pub fn build_asset_response(
    data: Bytes,
    headers: &AssetHeaders<'_>,
    is_head: bool,
) -> Response<ResponseBody> {
    let content_length = data.len();
    let body = if is_head { body::empty() } else { body::full(data) };

    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", headers.content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", headers.cache_control);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(body::empty())
    })
}

/// Build 206 Partial Content response; `data` is the whole asset
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    headers: &AssetHeaders<'_>,
    is_head: bool,
) -> Response<ResponseBody> {
    let body = if is_head {
        body::empty()
    } else {
        body::full(data.slice(range.start..=range.end))
    };

    let mut builder = Response::builder()
        .status(206)
        .header("Content-Type", headers.content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(data.len()))
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", headers.cache_control);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("206", &e);
        Response::new(body::empty())
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<ResponseBody> {
    let mut builder = Response::builder().status(304).header("ETag", etag);
    if let Some(last_modified) = last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }
    builder.body(body::empty()).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(body::empty())
    })
}

/// Build 301 redirect response
pub fn build_redirect_response(location: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(301)
        .header("Location", location)
        .header("Content-Type", "text/plain")
        .body(body::full("Moved Permanently"))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(body::empty())
        })
}

/// Build 401 Unauthorized response with a Basic challenge
pub fn build_401_response(realm: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(401)
        .header("WWW-Authenticate", format!("Basic realm=\"{realm}\""))
        .header("Content-Type", "text/plain")
        .body(body::full("401 Unauthorized"))
        .unwrap_or_else(|e| {
            log_build_error("401", &e);
            Response::new(body::full("401 Unauthorized"))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", allow)
        .body(body::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(body::full("405 Method Not Allowed"))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(size: usize) -> Response<ResponseBody> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{size}"))
        .body(body::full("Range Not Satisfiable"))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(body::full("Range Not Satisfiable"))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(body::full("Internal Server Error"))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(body::full("Internal Server Error"))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
