//! Default transport: hyper-util over rustls.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{self, Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::{
    Error, Request, Response, Result,
    config::TransportConfig,
    connector::https_connector,
    middleware::{LoggingLayer, SessionTokenLayer},
};

/// The transport as seen by middleware layers.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future returned by the transport's `Service` implementations.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

type HyperInner = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// `BoxedService` is `Send` but not `Sync`; the lock makes the layered
/// stack usable from `&self`.
#[derive(Clone)]
struct SharedStack(Arc<Mutex<BoxedService>>);

impl SharedStack {
    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        // Each call works on its own clone; the lock is held only to clone
        let mut stack = self.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Box::pin(async move { stack.call(request).await })
    }
}

/// Innermost service: sends a request with the client matching its TLS flag.
#[derive(Clone)]
struct Wire {
    verifying: HyperInner,
    permissive: HyperInner,
    timeout: Duration,
}

impl Wire {
    fn new(config: &TransportConfig) -> Self {
        let client =
            |verify_tls| Client::builder(TokioExecutor::new()).build(https_connector(verify_tls));
        Self {
            verifying: client(true),
            permissive: client(false),
            timeout: config.timeout,
        }
    }

    const fn client_for(&self, verify_tls: bool) -> &HyperInner {
        if verify_tls {
            &self.verifying
        } else {
            &self.permissive
        }
    }

    async fn send(self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let verify_tls = request.verify_tls();
        let outgoing = to_hyper(request)?;

        let pending = self.client_for(verify_tls).request(outgoing);
        let incoming = tokio::time::timeout(self.timeout, pending)
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(classify)?;

        let (parts, body) = incoming.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(parts.status.as_u16(), header_map(&parts.headers), body))
    }
}

impl Service<Request<Bytes>> for Wire {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        Box::pin(self.clone().send(request))
    }
}

/// Header names collapse case-insensitively, so each name goes out once.
fn to_hyper(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
    let (method, url, headers, body, _) = request.into_parts();

    let mut outgoing = http::Request::builder()
        .method(http::Method::from(method))
        .uri(url.as_str())
        .body(body.map_or_else(Full::default, Full::new))
        .map_err(|e| Error::invalid_request(e.to_string()))?;

    for (name, value) in &headers {
        let name = http::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        let value =
            http::HeaderValue::from_str(value).map_err(|e| Error::invalid_request(e.to_string()))?;
        outgoing.headers_mut().insert(name, value);
    }

    Ok(outgoing)
}

/// Response headers that are valid UTF-8; others are dropped.
fn header_map(headers: &http::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Flatten the error chain and tell TLS failures from plain connection ones.
#[allow(clippy::needless_pass_by_value)]
fn classify(err: legacy::Error) -> Error {
    let mut chain = vec![err.to_string()];
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    let message = chain.join(": ");

    let lower = message.to_lowercase();
    if ["certificate", "tls", "ssl"].iter().any(|word| lower.contains(word)) {
        Error::tls(message)
    } else {
        Error::connection(message)
    }
}

/// Default [`HttpClient`](crate::HttpClient): hyper-util over rustls, with
/// Tower middleware support.
///
/// Requests flagged with [`Request::verify_tls`] go through a connector
/// checking certificates against the webpki roots; the others through one
/// accepting any certificate.
///
/// # Example
///
/// ```ignore
/// use seagull::HyperClient;
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(5))
///     .with_session_token(server_token)
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    stack: SharedStack,
    config: TransportConfig,
}

impl fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// A client with a 30 second timeout and no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a client.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Transport settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.stack.call(request).await
    }
}

impl Service<Request<Bytes>> for HyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.stack.call(request)
    }
}

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Builder for [`HyperClient`].
///
/// The first layer added is the outermost one.
#[derive(Default)]
pub struct HyperClientBuilder {
    config: TransportConfig,
    layers: Vec<LayerFn>,
}

impl fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// How long to wait for a response (default: 30s).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Wrap the transport in a Tower layer.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers
            .push(Arc::new(move |inner| BoxCloneService::new(layer.layer(inner))));
        self
    }

    /// Log each call at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each call at debug level, headers included (session token masked).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Send `token` as the session token of calls that do not carry one.
    #[must_use]
    pub fn with_session_token(self, token: impl Into<String>) -> Self {
        self.layer(SessionTokenLayer::new(token))
    }

    /// Assemble the layers around the wire transport.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let wire: BoxedService = BoxCloneService::new(Wire::new(&self.config));
        let stack = self
            .layers
            .iter()
            .rev()
            .fold(wire, |inner, wrap| wrap(inner));

        HyperClient {
            stack: SharedStack(Arc::new(Mutex::new(stack))),
            config: self.config,
        }
    }
}
