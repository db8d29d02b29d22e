//! Per-call request builder and dispatch.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    ClientConfig, Error, HostLocator, HttpClient, Method, RequestSpec, Response, Result,
    StatusCodes, StatusHandlers, to_json,
};

/// Header carrying the caller's session token.
pub const SESSION_TOKEN_HEADER: &str = "x-tidepool-session-token";

/// One call being put together: what to send, and what to do with each
/// status code that may come back.
///
/// Created by [`MetadataClient`](crate::MetadataClient); consumed by
/// [`send`](Self::send), so a builder dispatches at most once.
///
/// # Example
///
/// ```ignore
/// let pair = client
///     .get_private_pair::<Pair>("1234", "uploads", &token)?
///     .when_status(401, |_| Err(Error::http(401, "token rejected")))
///     .send()
///     .await?;
/// ```
#[must_use = "a request does nothing until `send` is awaited"]
pub struct RequestBuilder<'a, C, L, T> {
    client: &'a C,
    hosts: &'a L,
    config: &'a ClientConfig,
    spec: RequestSpec,
    handlers: StatusHandlers<T>,
}

impl<'a, C, L, T> RequestBuilder<'a, C, L, T> {
    /// A GET of `path` with no headers and no handlers.
    pub fn new(
        client: &'a C,
        hosts: &'a L,
        config: &'a ClientConfig,
        path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            hosts,
            config,
            spec: RequestSpec::new(path),
            handlers: StatusHandlers::new(),
        }
    }

    /// Set the HTTP method (default: GET).
    pub fn with_method(mut self, method: Method) -> Self {
        self.spec = self.spec.with_method(method);
        self
    }

    /// Set a header. A later value for the same name, in any letter case,
    /// replaces the earlier one.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec = self.spec.with_header(name, value);
        self
    }

    /// Set the `x-tidepool-session-token` header.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_header(SESSION_TOKEN_HEADER, token)
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.spec = self.spec.with_body(body);
        self
    }

    /// Serialize `value` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonSerialization`] if `value` cannot be serialized.
    pub fn with_json<B: Serialize>(self, value: &B) -> Result<Self> {
        let body = to_json(value)?;
        Ok(self
            .with_header("content-type", "application/json")
            .with_body(body))
    }

    /// Register `handler` for one status code or a group of them.
    ///
    /// Replaces any handler previously registered for the same code.
    pub fn when_status<F>(mut self, status: impl StatusCodes, handler: F) -> Self
    where
        F: Fn(&Response<Bytes>) -> Result<T> + Send + Sync + 'static,
    {
        self.handlers.insert(status, handler);
        self
    }

    /// What will be sent.
    pub const fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// The status table.
    pub const fn handlers(&self) -> &StatusHandlers<T> {
        &self.handlers
    }
}

impl<C, L, T> RequestBuilder<'_, C, L, T>
where
    C: HttpClient,
    L: HostLocator,
{
    /// Dispatch the request to the first live host and route the response
    /// through the status table.
    ///
    /// # Errors
    ///
    /// - [`Error::NoHosts`] when the locator returns no host; nothing is sent
    /// - [`Error::InvalidUrl`] when host, prefix and path do not form a URL
    /// - transport errors, unchanged
    /// - whatever the matching handler returns
    /// - [`Error::Http`] when no handler is registered for the status
    pub async fn send(self) -> Result<T> {
        let Self {
            client,
            hosts,
            config,
            spec,
            handlers,
        } = self;

        let Some(host) = hosts.get().into_iter().next() else {
            warn!(path = spec.path(), "no metadata host available");
            return Err(Error::NoHosts);
        };

        let request = spec.resolve(&host, config.path_prefix(), config.secure_ssl())?;
        debug!(
            %host,
            method = %request.method(),
            url = %request.url(),
            "dispatching metadata request"
        );

        let response = client.execute(request).await?;
        if !handlers.contains(response.status()) {
            warn!(
                status = response.status(),
                handled = ?handlers,
                "unhandled metadata response status"
            );
        }
        handlers.handle(response)
    }
}

impl<C, L, T> fmt::Debug for RequestBuilder<'_, C, L, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("spec", &self.spec)
            .field("handlers", &self.handlers)
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Recording;
    use crate::{HostSpec, StaticHosts, absent};

    fn hosts() -> StaticHosts {
        StaticHosts::new([
            HostSpec::new("http", "first:9120"),
            HostSpec::new("http", "second:9120"),
        ])
    }

    #[tokio::test]
    async fn uses_first_host_and_prefix() {
        let client = Recording::answering(200, "\"ok\"");
        let hosts = hosts();
        let config = ClientConfig::new("/metadata/", true);

        let value: String = RequestBuilder::new(&client, &hosts, &config, "/1234/profile")
            .with_token("tok")
            .when_status(200, |r: &Response<Bytes>| r.json())
            .send()
            .await
            .expect("call succeeds");

        assert_eq!(value, "ok");
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url().as_str(), "http://first:9120/metadata/1234/profile");
        assert_eq!(requests[0].header(SESSION_TOKEN_HEADER), Some("tok"));
        assert!(requests[0].verify_tls());
    }

    #[tokio::test]
    async fn empty_host_list_sends_nothing() {
        let client = Recording::answering(200, "{}");
        let hosts = StaticHosts::empty();
        let config = ClientConfig::default();

        let err = RequestBuilder::new(&client, &hosts, &config, "/1234/groups")
            .when_status(404, absent::<()>)
            .send()
            .await
            .expect_err("call fails");

        assert!(err.is_no_hosts());
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "No hosts found");
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn last_header_value_wins() {
        let client = Recording::answering(204, "");
        let hosts = hosts();
        let config = ClientConfig::default();

        RequestBuilder::new(&client, &hosts, &config, "/x")
            .with_header("x", "a")
            .with_header("x", "b")
            .when_status(204, |_: &Response<Bytes>| Ok(()))
            .send()
            .await
            .expect("call succeeds");

        let requests = client.requests();
        assert_eq!(requests[0].header("x"), Some("b"));
        assert_eq!(requests[0].headers().len(), 1);
        assert!(!requests[0].verify_tls());
    }

    #[tokio::test]
    async fn token_header_ignores_letter_case() {
        let client = Recording::answering(204, "");
        let hosts = hosts();
        let config = ClientConfig::default();

        RequestBuilder::new(&client, &hosts, &config, "/1234/profile")
            .with_token("first")
            .with_header("X-Tidepool-Session-Token", "second")
            .when_status(204, |_: &Response<Bytes>| Ok(()))
            .send()
            .await
            .expect("call succeeds");

        let requests = client.requests();
        assert_eq!(requests[0].headers().len(), 1);
        assert_eq!(requests[0].header(SESSION_TOKEN_HEADER), Some("second"));
        assert_eq!(requests[0].header("X-Tidepool-Session-Token"), Some("second"));
    }

    #[tokio::test]
    async fn unhandled_status_renders_body() {
        let client = Recording::answering(500, "boom");
        let hosts = hosts();
        let config = ClientConfig::default();

        let err = RequestBuilder::new(&client, &hosts, &config, "/x")
            .when_status(200, |_: &Response<Bytes>| Ok(()))
            .send()
            .await
            .expect_err("call fails");

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), r#"HTTP error 500: "boom""#);
        assert_eq!(err.body(), Some(&Bytes::from_static(b"boom")));
    }

    #[tokio::test]
    async fn unparsable_url_is_reported_through_send() {
        let client = Recording::answering(200, "");
        let hosts = StaticHosts::new([HostSpec::new("http", "bad host")]);
        let config = ClientConfig::default();

        let err = RequestBuilder::new(&client, &hosts, &config, "/x")
            .when_status(200, |_: &Response<Bytes>| Ok(()))
            .send()
            .await
            .expect_err("call fails");

        assert!(matches!(err, Error::InvalidUrl(_)));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn json_body_and_method() {
        let client = Recording::answering(201, "");
        let hosts = hosts();
        let config = ClientConfig::default();

        RequestBuilder::new(&client, &hosts, &config, "/1234/notes")
            .with_method(Method::Post)
            .with_json(&serde_json::json!({"note": "hi"}))
            .expect("serializable")
            .when_status([200, 201], |_: &Response<Bytes>| Ok(()))
            .send()
            .await
            .expect("call succeeds");

        let request = &client.requests()[0];
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body(), Some(&Bytes::from_static(br#"{"note":"hi"}"#)));
    }

    #[test]
    fn debug_shows_spec_and_codes() {
        let client = Recording::answering(200, "");
        let hosts = hosts();
        let config = ClientConfig::default();

        let builder = RequestBuilder::new(&client, &hosts, &config, "/1234/profile")
            .when_status(404, absent::<()>);
        let debug = format!("{builder:?}");
        assert!(debug.contains("/1234/profile"));
        assert!(debug.contains("{404}"));
    }
}
