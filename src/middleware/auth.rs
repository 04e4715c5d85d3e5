//! HTTP Basic authentication.
//!
//! Pure gatekeeping: a request either carries credentials present in the
//! [`CredentialSet`] and passes through unchanged, or it is answered with
//! `401 Unauthorized` and a `WWW-Authenticate` challenge.

use super::{handler_fn, BoxedHandler, Middleware};
use crate::error::ConfigError;
use crate::http;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::header::HeaderValue;
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;

const DEFAULT_REALM: &str = "Restricted";

/// Username to password map, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    users: HashMap<String, String>,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingHeader,
    Malformed,
    UnknownUser,
    WrongPassword,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `user:pass[,user:pass...]`.
    ///
    /// The password is everything after the first `:` and may itself contain
    /// colons. An empty list yields an empty set.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut set = Self::new();
        if list.is_empty() {
            return Ok(set);
        }
        for entry in list.split(',') {
            let (user, pass) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidCredential(entry.to_string()))?;
            set.insert(user, pass);
        }
        Ok(set)
    }

    pub fn insert(&mut self, user: impl Into<String>, pass: impl Into<String>) {
        self.users.insert(user.into(), pass.into());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Check an `Authorization` header value against the set.
    pub fn verify(&self, authorization: Option<&HeaderValue>) -> Result<(), AuthFailure> {
        let header = authorization.ok_or(AuthFailure::MissingHeader)?;
        let (user, pass) = decode_basic(header).ok_or(AuthFailure::Malformed)?;

        let expected = self.users.get(&user).ok_or(AuthFailure::UnknownUser)?;
        if bool::from(expected.as_bytes().ct_eq(pass.as_bytes())) {
            Ok(())
        } else {
            Err(AuthFailure::WrongPassword)
        }
    }
}

/// Decode `Basic <base64(user:pass)>` into its parts.
fn decode_basic(header: &HeaderValue) -> Option<(String, String)> {
    let value = header.to_str().ok()?.trim();
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Basic authentication middleware.
pub struct BasicAuth {
    credentials: Arc<CredentialSet>,
    realm: Arc<str>,
}

impl BasicAuth {
    pub fn new(credentials: CredentialSet) -> Self {
        Self {
            credentials: Arc::new(credentials),
            realm: Arc::from(DEFAULT_REALM),
        }
    }
}

impl Middleware for BasicAuth {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let credentials = Arc::clone(&self.credentials);
        let realm = Arc::clone(&self.realm);
        handler_fn(move |req| {
            let verdict = credentials.verify(req.headers().get("authorization"));
            let next = Arc::clone(&next);
            let realm = Arc::clone(&realm);
            async move {
                match verdict {
                    Ok(()) => next.call(req).await,
                    Err(_) => http::build_401_response(&realm),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body::testing::request_body;
    use crate::middleware::testing::counting_handler;
    use hyper::Request;
    use std::sync::atomic::Ordering;

    fn basic(user_pass: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(user_pass))).unwrap()
    }

    fn creds() -> CredentialSet {
        CredentialSet::parse("alice:s3cret,bob:pa:ss").unwrap()
    }

    #[test]
    fn test_parse_credentials() {
        let set = creds();
        assert_eq!(set.len(), 2);
        assert!(set.verify(Some(&basic("bob:pa:ss"))).is_ok());
        assert!(CredentialSet::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = CredentialSet::parse("alice:s3cret,bob").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCredential(ref e) if e == "bob"));
        assert!(CredentialSet::parse("alice:s3cret,").is_err());
    }

    #[test]
    fn test_verify_outcomes() {
        let set = creds();
        assert_eq!(set.verify(Some(&basic("alice:s3cret"))), Ok(()));
        assert_eq!(set.verify(None), Err(AuthFailure::MissingHeader));
        assert_eq!(set.verify(Some(&basic("alice:wrong"))), Err(AuthFailure::WrongPassword));
        assert_eq!(set.verify(Some(&basic("carol:s3cret"))), Err(AuthFailure::UnknownUser));
        assert_eq!(set.verify(Some(&basic("alices3cret"))), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let set = creds();
        assert_eq!(set.verify(Some(&basic("Alice:s3cret"))), Err(AuthFailure::UnknownUser));
        assert_eq!(set.verify(Some(&basic("alice:S3CRET"))), Err(AuthFailure::WrongPassword));
    }

    #[test]
    fn test_verify_rejects_bad_encoding() {
        let set = creds();
        let bearer = HeaderValue::from_static("Bearer abc");
        let garbage = HeaderValue::from_static("Basic !!!not-base64!!!");
        let no_scheme = HeaderValue::from_static("YWxpY2U6czNjcmV0");
        assert_eq!(set.verify(Some(&bearer)), Err(AuthFailure::Malformed));
        assert_eq!(set.verify(Some(&garbage)), Err(AuthFailure::Malformed));
        assert_eq!(set.verify(Some(&no_scheme)), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let set = creds();
        let header =
            HeaderValue::from_str(&format!("basic {}", STANDARD.encode("alice:s3cret"))).unwrap();
        assert!(set.verify(Some(&header)).is_ok());
    }

    async fn call(authorization: Option<HeaderValue>) -> (hyper::Response<crate::http::ResponseBody>, usize) {
        let (base, hits) = counting_handler();
        let handler = BasicAuth::new(creds()).wrap(base);
        let mut builder = Request::builder().method("PROPFIND").uri("/webdav/");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        let resp = handler.call(builder.body(request_body("")).unwrap()).await;
        (resp, hits.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_missing_header_is_challenged() {
        let (resp, hits) = call(None).await;
        assert_eq!(resp.status(), 401);
        assert_eq!(resp.headers()["www-authenticate"], "Basic realm=\"Restricted\"");
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn test_wrong_password_never_reaches_downstream() {
        let (resp, hits) = call(Some(basic("alice:guess"))).await;
        assert_eq!(resp.status(), 401);
        assert_eq!(hits, 0);
    }

    #[tokio::test]
    async fn test_valid_credentials_pass_through() {
        let (resp, hits) = call(Some(basic("alice:s3cret"))).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(hits, 1);
    }
}
