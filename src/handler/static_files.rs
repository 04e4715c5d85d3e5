//! Static asset responder
//!
//! Serves the web UI bundle. Application routes and unknown files both fall
//! back to the shell document so the client-side router can take over; the
//! only hard failure is an unreadable shell.

use crate::assets::{SharedBundle, SHELL_DOCUMENT};
use crate::http::cache::{self, CachePolicy};
use crate::http::range::RangeOutcome;
use crate::http::response::{self, AssetHeaders};
use crate::http::{self as http_layer, mime, RequestBody, ResponseBody};
use crate::logger;
use crate::middleware::{BoxFuture, Handler};
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::time::SystemTime;

/// Request context encapsulating information needed for asset delivery
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range_header: Option<&'a str>,
    pub if_range: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(path: &'a str, method: &Method, headers: &'a HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            path,
            is_head: *method == Method::HEAD,
            if_none_match: header("if-none-match"),
            if_modified_since: header("if-modified-since"),
            range_header: header("range"),
            if_range: header("if-range"),
        }
    }
}

/// Single-page application asset handler
#[derive(Clone)]
pub struct StaticAssets {
    bundle: SharedBundle,
}

impl StaticAssets {
    pub fn new(bundle: SharedBundle) -> Self {
        Self { bundle }
    }

    /// Answer one asset request.
    pub fn serve(&self, ctx: &RequestContext<'_>) -> Response<ResponseBody> {
        let found = resolve_asset_path(ctx.path)
            .and_then(|requested| self.bundle.read(&requested).map(|data| (requested, data)));

        let (path, data) = match found {
            Some(found) => found,
            None => match self.bundle.read(SHELL_DOCUMENT) {
                Some(data) => (SHELL_DOCUMENT.to_string(), data),
                None => {
                    logger::log_error(&format!(
                        "Shell document {SHELL_DOCUMENT} missing from asset bundle (request {})",
                        ctx.path
                    ));
                    return http_layer::build_500_response();
                }
            },
        };

        let policy = if path == SHELL_DOCUMENT {
            CachePolicy::NoCache
        } else {
            CachePolicy::default()
        };
        let modified = self.bundle.modified(&path);
        build_asset_response(ctx, &path, data, modified, policy)
    }
}

impl Handler for StaticAssets {
    fn call(&self, req: Request<RequestBody>) -> BoxFuture {
        let resp = match *req.method() {
            Method::GET | Method::HEAD => {
                let ctx = RequestContext::from_parts(req.uri().path(), req.method(), req.headers());
                self.serve(&ctx)
            }
            _ => http_layer::build_405_response("GET, HEAD"),
        };
        Box::pin(async move { resp })
    }
}

/// Map a request path to a bundle key.
///
/// The path is percent-decoded first; `None` means it does not decode to
/// UTF-8 and can never name an asset. The root and any path whose final
/// segment has no `.` are application routes and always map to the shell
/// document. Other paths are cleaned the way a filesystem join would: empty
/// and `.` segments vanish and `..` never climbs above the bundle root.
pub fn resolve_asset_path(request_path: &str) -> Option<String> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;

    let last_segment = decoded.rsplit('/').next().unwrap_or("");
    if !last_segment.contains('.') {
        return Some(SHELL_DOCUMENT.to_string());
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        Some(SHELL_DOCUMENT.to_string())
    } else {
        Some(segments.join("/"))
    }
}

fn build_asset_response(
    ctx: &RequestContext<'_>,
    path: &str,
    data: Bytes,
    modified: Option<SystemTime>,
    policy: CachePolicy,
) -> Response<ResponseBody> {
    let etag = cache::generate_etag(&data);
    let last_modified = modified.map(cache::format_http_date);
    let cache_control = policy.to_header_value();
    let headers = AssetHeaders {
        content_type: mime::get_content_type(path),
        etag: &etag,
        last_modified: last_modified.as_deref(),
        cache_control: &cache_control,
    };

    // If-None-Match takes precedence over If-Modified-Since
    let not_modified = if ctx.if_none_match.is_some() {
        cache::check_etag_match(ctx.if_none_match, &etag)
    } else {
        modified.is_some_and(|m| cache::check_not_modified_since(ctx.if_modified_since, m))
    };
    if not_modified {
        return http_layer::build_304_response(&etag, headers.last_modified);
    }

    // A stale If-Range validator turns the range request into a full one
    let range_header = if cache::check_if_range(ctx.if_range, &etag, modified) {
        ctx.range_header
    } else {
        None
    };
    match http_layer::parse_range_header(range_header, data.len()) {
        RangeOutcome::Partial(range) => {
            response::build_partial_response(&data, range, &headers, ctx.is_head)
        }
        RangeOutcome::NotSatisfiable => http_layer::build_416_response(data.len()),
        RangeOutcome::Full => response::build_asset_response(data, &headers, ctx.is_head),
    }
}
