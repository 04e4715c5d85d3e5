//! Request routing dispatch module
//!
//! One prefix decides everything: requests under the WebDAV prefix go through
//! the middleware chain to the protocol engine, the bare prefix is redirected
//! to its directory form, and every other path is a web UI asset.

use crate::handler::static_files::StaticAssets;
use crate::http::{self, body, RequestBody, ResponseBody};
use crate::middleware::access_log::RemoteAddr;
use crate::middleware::{BoxedHandler, Chain, Handler};
use hyper::body::Incoming;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Where a request path is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    WebDav,
    /// The prefix without its trailing slash
    PrefixRedirect,
    Assets,
}

/// Prefix router between the WebDAV engine and the web UI.
#[derive(Clone)]
pub struct ProtocolRouter {
    prefix: Arc<str>,
    dav: BoxedHandler,
    assets: StaticAssets,
}

impl ProtocolRouter {
    /// `chain` is applied to `dav` once, here; the asset responder is never
    /// wrapped.
    pub fn new(prefix: &str, chain: &Chain, dav: BoxedHandler, assets: StaticAssets) -> Self {
        Self {
            prefix: Arc::from(normalize_prefix(prefix)),
            dav: chain.apply(dav),
            assets,
        }
    }

    pub fn route(&self, path: &str) -> Route {
        if path.starts_with(&*self.prefix) {
            Route::WebDav
        } else if path == self.prefix.trim_end_matches('/') {
            Route::PrefixRedirect
        } else {
            Route::Assets
        }
    }

    /// Entry point for one request read off a connection.
    pub async fn dispatch(
        &self,
        req: Request<Incoming>,
        remote: SocketAddr,
    ) -> Result<Response<ResponseBody>, Infallible> {
        let mut req = req.map(body::from_incoming);
        req.extensions_mut().insert(RemoteAddr(remote));
        Ok(self.call(req).await)
    }
}

impl Handler for ProtocolRouter {
    fn call(&self, req: Request<RequestBody>) -> crate::middleware::BoxFuture {
        match self.route(req.uri().path()) {
            Route::WebDav => self.dav.call(req),
            Route::PrefixRedirect => {
                let resp = http::build_redirect_response(&self.prefix);
                Box::pin(async move { resp })
            }
            Route::Assets => self.assets.call(req),
        }
    }
}

/// Force a leading and trailing `/`; an empty prefix becomes `/`.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryBundle;
    use crate::http::body::testing::{collect, request_body};
    use crate::middleware::testing::counting_handler;
    use crate::middleware::{BasicAuth, Cors, CorsPolicy, CredentialSet, RequestTagger};
    use std::sync::atomic::Ordering;
    use std::time::SystemTime;

    const SHELL: &str = "<!doctype html><app-root></app-root>";

    fn assets() -> StaticAssets {
        let bundle = MemoryBundle::new()
            .with_file("index.html", SHELL, SystemTime::UNIX_EPOCH)
            .with_file("styles.css", "h1 {}", SystemTime::UNIX_EPOCH);
        StaticAssets::new(Arc::new(bundle))
    }

    fn request(method: &str, uri: &str) -> Request<RequestBody> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(request_body(""))
            .unwrap()
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/webdav/"), "/webdav/");
        assert_eq!(normalize_prefix("webdav"), "/webdav/");
        assert_eq!(normalize_prefix("/files/dav"), "/files/dav/");
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
    }

    #[test]
    fn test_route_by_prefix() {
        let (dav, _) = counting_handler();
        let router = ProtocolRouter::new("/webdav/", &Chain::default(), dav, assets());
        assert_eq!(router.route("/webdav/"), Route::WebDav);
        assert_eq!(router.route("/webdav/a/b.txt"), Route::WebDav);
        assert_eq!(router.route("/webdav"), Route::PrefixRedirect);
        assert_eq!(router.route("/webdavx"), Route::Assets);
        assert_eq!(router.route("/"), Route::Assets);
        assert_eq!(router.route("/settings"), Route::Assets);
    }

    #[tokio::test]
    async fn test_dispatches_to_engine_and_assets() {
        let (dav, hits) = counting_handler();
        let router = ProtocolRouter::new("/webdav/", &Chain::default(), dav, assets());

        let resp = router.call(request("PROPFIND", "/webdav/docs/")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let resp = router.call(request("GET", "/files/recent")).await;
        assert_eq!(collect(resp.into_body()).await, SHELL);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bare_prefix_redirects() {
        let (dav, hits) = counting_handler();
        let router = ProtocolRouter::new("/webdav/", &Chain::default(), dav, assets());

        let resp = router.call(request("GET", "/webdav")).await;
        assert_eq!(resp.status(), 301);
        assert_eq!(resp.headers()["location"], "/webdav/");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chain_wraps_engine_only() {
        let (dav, hits) = counting_handler();
        let creds = CredentialSet::parse("alice:secret").unwrap();
        let chain = Chain::default().with(BasicAuth::new(creds)).with(RequestTagger);
        let router = ProtocolRouter::new("/webdav/", &chain, dav, assets());

        let resp = router.call(request("GET", "/webdav/file.txt")).await;
        assert_eq!(resp.status(), 401);
        assert!(resp.headers().contains_key("x-request-id"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        // Assets are public and untagged
        let resp = router.call(request("GET", "/styles.css")).await;
        assert_eq!(resp.status(), 200);
        assert!(!resp.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_preflight_never_reaches_engine() {
        let (dav, hits) = counting_handler();
        let policy = CorsPolicy::from_lists("https://app.example.com", "GET,PROPFIND", "Depth", true);
        let creds = CredentialSet::parse("alice:secret").unwrap();
        let chain = Chain::default()
            .with(BasicAuth::new(creds))
            .with(RequestTagger)
            .with(Cors::new(policy));
        let router = ProtocolRouter::new("/webdav/", &chain, dav, assets());

        let mut req = request("OPTIONS", "/webdav/docs/");
        req.headers_mut()
            .insert("origin", "https://app.example.com".parse().unwrap());
        req.headers_mut()
            .insert("access-control-request-method", "PROPFIND".parse().unwrap());
        let resp = router.call(req).await;

        assert_eq!(resp.status(), 204);
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "https://app.example.com"
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bare_options_is_authenticated_like_any_dav_call() {
        let (dav, hits) = counting_handler();
        let policy = CorsPolicy::from_lists("*", "GET,PROPFIND", "Depth", true);
        let creds = CredentialSet::parse("alice:secret").unwrap();
        let chain = Chain::default()
            .with(BasicAuth::new(creds))
            .with(Cors::new(policy));
        let router = ProtocolRouter::new("/webdav/", &chain, dav, assets());

        let resp = router.call(request("OPTIONS", "/webdav/")).await;
        assert_eq!(resp.status(), 401);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
