//! Cross-origin resource sharing.
//!
//! [`CorsPolicy::evaluate`] decides whether a request's `Origin` is allowed
//! and computes the `Access-Control-Allow-*` values to emit. The [`Cors`]
//! middleware applies that decision to every response and answers preflight
//! requests itself.
//!
//! A preflight is an `OPTIONS` request that carries an `Origin` header. This
//! is narrower than treating every `OPTIONS` as a preflight: a bare `OPTIONS`
//! is a WebDAV capability probe and continues down the chain, so it meets
//! authentication and then the engine instead of a bodiless 204.

use super::{handler_fn, BoxedHandler, Middleware};
use crate::http::body;
use hyper::header::HeaderValue;
use hyper::{HeaderMap, Method, Response};
use std::sync::Arc;

const WILDCARD: &str = "*";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// Immutable CORS configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    origins: Vec<String>,
    methods: Vec<String>,
    headers: Vec<String>,
    allow_credentials: bool,
}

/// Header values computed for one allowed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsHeaders {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    pub allow_credentials: bool,
    /// True when the response depends on the request's `Origin`
    pub vary_origin: bool,
}

impl CorsPolicy {
    /// Build a policy from raw lists. Entries are trimmed; empty ones dropped.
    pub fn new<I, S>(origins: I, methods: I, headers: I, allow_credentials: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            origins: clean(origins),
            methods: clean(methods),
            headers: clean(headers),
            allow_credentials,
        }
    }

    /// Build a policy from comma-separated lists, as given on the command line.
    pub fn from_lists(origins: &str, methods: &str, headers: &str, allow_credentials: bool) -> Self {
        Self::new(
            origins.split(','),
            methods.split(','),
            headers.split(','),
            allow_credentials,
        )
    }

    pub fn allows_any_origin(&self) -> bool {
        self.origins.iter().any(|o| o == WILDCARD)
    }

    /// Decide whether `origin` may read the response.
    ///
    /// Returns `None` for requests without an `Origin` and for origins not in
    /// the allow-list; such responses carry no CORS headers.
    pub fn evaluate(&self, origin: Option<&str>) -> Option<CorsHeaders> {
        let origin = origin?;

        let allow_origin = if self.allows_any_origin() {
            // A credentialed response may not use the wildcard.
            if self.allow_credentials {
                origin.to_string()
            } else {
                WILDCARD.to_string()
            }
        } else if self.origins.iter().any(|o| o == origin) {
            origin.to_string()
        } else {
            return None;
        };

        Some(CorsHeaders {
            vary_origin: allow_origin != WILDCARD,
            allow_origin,
            allow_methods: self.methods.join(", "),
            allow_headers: self.headers.join(", "),
            allow_credentials: self.allow_credentials,
        })
    }
}

impl CorsHeaders {
    /// Write the headers into a response header map.
    ///
    /// Values that are not valid header text are skipped.
    pub fn apply(&self, headers: &mut HeaderMap) {
        insert(headers, "access-control-allow-origin", &self.allow_origin);
        if !self.allow_methods.is_empty() {
            insert(headers, "access-control-allow-methods", &self.allow_methods);
        }
        if !self.allow_headers.is_empty() {
            insert(headers, "access-control-allow-headers", &self.allow_headers);
        }
        if self.allow_credentials {
            headers.insert(
                "access-control-allow-credentials",
                HeaderValue::from_static("true"),
            );
        }
        if self.vary_origin {
            headers.append("vary", HeaderValue::from_static("Origin"));
        }
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => crate::logger::log_warning(&format!("Skipping invalid {name} value: {value:?}")),
    }
}

fn clean<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// CORS middleware.
pub struct Cors {
    policy: Arc<CorsPolicy>,
}

impl Cors {
    pub fn new(policy: CorsPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl Middleware for Cors {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let policy = Arc::clone(&self.policy);
        handler_fn(move |req| {
            let origin = req
                .headers()
                .get("origin")
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let decision = policy.evaluate(origin.as_deref());
            // OPTIONS without an Origin is a WebDAV capability probe, not a preflight.
            let preflight = req.method() == Method::OPTIONS && origin.is_some();
            let next = Arc::clone(&next);

            async move {
                if preflight {
                    return preflight_response(decision.as_ref());
                }

                let mut resp = next.call(req).await;
                if let Some(cors) = &decision {
                    cors.apply(resp.headers_mut());
                }
                resp
            }
        })
    }
}

fn preflight_response(decision: Option<&CorsHeaders>) -> Response<crate::http::ResponseBody> {
    let mut resp = Response::new(body::empty());
    *resp.status_mut() = hyper::StatusCode::NO_CONTENT;
    if let Some(cors) = decision {
        cors.apply(resp.headers_mut());
        resp.headers_mut().insert(
            "access-control-max-age",
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body::testing::request_body;
    use crate::middleware::testing::counting_handler;
    use crate::middleware::Chain;
    use hyper::Request;
    use std::sync::atomic::Ordering;

    fn policy(origins: &str, credentials: bool) -> CorsPolicy {
        CorsPolicy::from_lists(origins, "GET,PUT,PROPFIND", "Content-Type,Depth", credentials)
    }

    fn request(method: Method, origin: Option<&str>) -> Request<crate::http::RequestBody> {
        let mut builder = Request::builder().method(method).uri("/webdav/notes.md");
        if let Some(origin) = origin {
            builder = builder.header("origin", origin);
        }
        builder.body(request_body("")).unwrap()
    }

    #[test]
    fn test_wildcard_without_credentials_echoes_wildcard() {
        let headers = policy("*", false).evaluate(Some("https://a.example")).unwrap();
        assert_eq!(headers.allow_origin, "*");
        assert!(!headers.vary_origin);
        assert!(!headers.allow_credentials);
    }

    #[test]
    fn test_wildcard_with_credentials_echoes_origin() {
        let headers = policy("*", true).evaluate(Some("https://a.example")).unwrap();
        assert_eq!(headers.allow_origin, "https://a.example");
        assert!(headers.vary_origin);
        assert!(headers.allow_credentials);
    }

    #[test]
    fn test_listed_origins_are_echoed() {
        let p = policy("https://a.example, https://b.example", false);
        for origin in ["https://a.example", "https://b.example"] {
            assert_eq!(p.evaluate(Some(origin)).unwrap().allow_origin, origin);
        }
    }

    #[test]
    fn test_unlisted_origin_gets_nothing() {
        let p = policy("https://a.example", true);
        assert!(p.evaluate(Some("https://evil.example")).is_none());
        assert!(p.evaluate(Some("https://a.example.evil")).is_none());
        assert!(p.evaluate(None).is_none());
    }

    #[test]
    fn test_lists_are_joined() {
        let headers = policy("*", false).evaluate(Some("https://a.example")).unwrap();
        assert_eq!(headers.allow_methods, "GET, PUT, PROPFIND");
        assert_eq!(headers.allow_headers, "Content-Type, Depth");
    }

    #[test]
    fn test_empty_entries_dropped() {
        let p = CorsPolicy::from_lists("https://a.example,,", " GET , ", "", false);
        let headers = p.evaluate(Some("https://a.example")).unwrap();
        assert_eq!(headers.allow_methods, "GET");
        assert_eq!(headers.allow_headers, "");
        let mut map = HeaderMap::new();
        headers.apply(&mut map);
        assert!(map.get("access-control-allow-headers").is_none());
    }

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let (base, hits) = counting_handler();
        let handler = Chain::default()
            .with(Cors::new(policy("https://a.example", true)))
            .apply(base);

        let resp = handler
            .call(request(Method::OPTIONS, Some("https://a.example")))
            .await;

        assert_eq!(resp.status(), 204);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        let h = resp.headers();
        assert_eq!(h["access-control-allow-origin"], "https://a.example");
        assert_eq!(h["access-control-allow-methods"], "GET, PUT, PROPFIND");
        assert_eq!(h["access-control-allow-credentials"], "true");
        assert_eq!(h["access-control-max-age"], PREFLIGHT_MAX_AGE);
    }

    #[tokio::test]
    async fn test_preflight_from_disallowed_origin_has_no_headers() {
        let (base, hits) = counting_handler();
        let handler = Cors::new(policy("https://a.example", false)).wrap(base);

        let resp = handler
            .call(request(Method::OPTIONS, Some("https://evil.example")))
            .await;

        assert_eq!(resp.status(), 204);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_options_without_origin_reaches_engine() {
        let (base, hits) = counting_handler();
        let handler = Cors::new(policy("*", false)).wrap(base);

        let resp = handler.call(request(Method::OPTIONS, None)).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_simple_request_gets_headers_and_proceeds() {
        let (base, hits) = counting_handler();
        let handler = Cors::new(policy("*", false)).wrap(base);

        let resp = handler
            .call(request(Method::GET, Some("https://a.example")))
            .await;

        assert_eq!(resp.status(), 200);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert!(resp.headers().get("vary").is_none());
    }

    #[tokio::test]
    async fn test_disallowed_origin_still_proceeds() {
        let (base, hits) = counting_handler();
        let handler = Cors::new(policy("https://a.example", false)).wrap(base);

        let resp = handler
            .call(request(Method::GET, Some("https://evil.example")))
            .await;

        assert_eq!(resp.status(), 200);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }
}
