//! HTTP request types.
//!
//! - [`RequestSpec`] is what a call wants: method, headers, body and a path
//!   relative to the service. It knows nothing about hosts.
//! - [`Request`] is what the transport executes: the spec resolved against a
//!   concrete host, plus the TLS-verification flag.
//!
//! # Example
//!
//! ```
//! use seagull_core::{HostSpec, Method, RequestSpec};
//!
//! let host = HostSpec::new("https", "metadata.example.com");
//! let request = RequestSpec::new("/user-1/profile")
//!     .with_header("x-tidepool-session-token", "abc")
//!     .resolve(&host, "/metadata", true)
//!     .expect("valid url");
//!
//! assert_eq!(request.method(), Method::Get);
//! assert_eq!(request.url().as_str(), "https://metadata.example.com/metadata/user-1/profile");
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use url::Url;

use crate::{HostSpec, Method, Result};

// ============================================================================
// Request Spec
// ============================================================================

/// Host-independent description of one call.
///
/// Header names are unique and stored in lowercase: setting a header twice,
/// in any letter case, keeps the last value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: Method,
    path: String,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl RequestSpec {
    /// Creates a GET spec for `path`.
    ///
    /// The path is used as given and appended to the host and path prefix
    /// without further escaping.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            method: Method::default(),
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets a header, replacing any previous value for the same name.
    ///
    /// Names are compared ignoring ASCII case.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut name = name.into();
        name.make_ascii_lowercase();
        self.headers.insert(name, value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the service.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Absolute URL of this spec on `host`: `scheme://host` + `path_prefix` + path.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidUrl`] if the joined string is not a URL.
    pub fn url_on(&self, host: &HostSpec, path_prefix: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{host}{path_prefix}{}", self.path))?)
    }

    /// Freeze this spec into a transport [`Request`] aimed at `host`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidUrl`] if the joined string is not a URL.
    pub fn resolve(self, host: &HostSpec, path_prefix: &str, verify_tls: bool) -> Result<Request> {
        let url = self.url_on(host, path_prefix)?;
        Ok(Request {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
            verify_tls,
        })
    }
}

// ============================================================================
// Request
// ============================================================================

/// An HTTP request with method, absolute URL, headers, optional body and the
/// TLS certificate verification flag.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: Url,
    headers: HashMap<String, String>,
    body: Option<B>,
    verify_tls: bool,
}

impl<B> Request<B> {
    /// Creates a request with no headers and no body that verifies TLS
    /// certificates.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
            verify_tls: true,
        }
    }

    /// Reassemble a request from its parts.
    #[must_use]
    pub fn from_parts(
        method: Method,
        url: Url,
        headers: HashMap<String, String>,
        body: Option<B>,
        verify_tls: bool,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            verify_tls,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Single header value by name, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str).or_else(|| {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Whether the transport must verify the server certificate.
    #[must_use]
    pub const fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// Consume into (method, url, headers, body, `verify_tls`).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, HashMap<String, String>, Option<B>, bool) {
        (
            self.method,
            self.url,
            self.headers,
            self.body,
            self.verify_tls,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostSpec {
        HostSpec::new("http", "localhost:8009")
    }

    #[test]
    fn spec_defaults() {
        let spec = RequestSpec::new("/user/profile");
        assert_eq!(spec.method(), Method::Get);
        assert_eq!(spec.path(), "/user/profile");
        assert!(spec.headers().is_empty());
        assert!(spec.body().is_none());
    }

    #[test]
    fn header_last_write_wins() {
        let spec = RequestSpec::new("/x")
            .with_header("x", "a")
            .with_header("x", "b");
        assert_eq!(spec.headers().len(), 1);
        assert_eq!(spec.headers().get("x").map(String::as_str), Some("b"));
    }

    #[test]
    fn header_names_ignore_case() {
        let spec = RequestSpec::new("/x")
            .with_header("x-tidepool-session-token", "first")
            .with_header("X-Tidepool-Session-Token", "second");
        assert_eq!(spec.headers().len(), 1);
        assert_eq!(
            spec.headers().get("x-tidepool-session-token").map(String::as_str),
            Some("second")
        );

        let request = spec.resolve(&host(), "", true).expect("valid url");
        assert_eq!(request.header("X-TIDEPOOL-SESSION-TOKEN"), Some("second"));
    }

    #[test]
    fn resolve_joins_host_prefix_and_path() {
        let request = RequestSpec::new("/userId/private/hashName")
            .with_method(Method::Post)
            .with_body("payload")
            .resolve(&host(), "/metadata", false)
            .expect("valid url");

        assert_eq!(request.method(), Method::Post);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8009/metadata/userId/private/hashName"
        );
        assert_eq!(request.body(), Some(&Bytes::from_static(b"payload")));
        assert!(!request.verify_tls());
    }

    #[test]
    fn resolve_without_prefix() {
        let url = RequestSpec::new("/userId/groups")
            .url_on(&host(), "")
            .expect("valid url");
        assert_eq!(url.as_str(), "http://localhost:8009/userId/groups");
    }

    #[test]
    fn resolve_keeps_caller_escaping() {
        let url = RequestSpec::new("/user%2F1/profile")
            .url_on(&host(), "")
            .expect("valid url");
        assert_eq!(url.path(), "/user%2F1/profile");
    }

    #[test]
    fn resolve_rejects_bad_host() {
        let bad = HostSpec::new("http", "bad host");
        let result = RequestSpec::new("/a").resolve(&bad, "", true);
        assert!(matches!(result, Err(crate::Error::InvalidUrl(_))));
    }

    #[test]
    fn request_parts_round_trip() {
        let url = Url::parse("https://example.com/a").expect("valid url");
        let mut request = Request::<Bytes>::new(Method::Get, url);
        request
            .headers_mut()
            .insert("accept".to_string(), "application/json".to_string());

        assert!(request.verify_tls());
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("Accept"), Some("application/json"));

        let (method, url, headers, body, verify_tls) = request.into_parts();
        let rebuilt = Request::from_parts(method, url, headers, body, verify_tls);
        assert_eq!(rebuilt.header("accept"), Some("application/json"));
    }
}
