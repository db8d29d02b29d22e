//! Session token middleware.
//!
//! Services calling seagull usually hold one server token for all their
//! calls. This layer stamps it on every outgoing request, unless the call
//! already set its own token.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};

use crate::{Error, Request, Response, Result, SESSION_TOKEN_HEADER};

/// Layer that adds a default `x-tidepool-session-token` header.
///
/// # Example
///
/// ```ignore
/// use seagull::middleware::SessionTokenLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(SessionTokenLayer::new("server-token"))
///     .service(client);
/// ```
#[derive(Debug, Clone)]
pub struct SessionTokenLayer {
    token: Arc<str>,
}

impl SessionTokenLayer {
    /// Create a new session token layer with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl<S> Layer<S> for SessionTokenLayer {
    type Service = SessionToken<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionToken {
            inner,
            token: Arc::clone(&self.token),
        }
    }
}

/// Service that adds a default session token to requests.
#[derive(Debug, Clone)]
pub struct SessionToken<S> {
    inner: S,
    token: Arc<str>,
}

impl<S> SessionToken<S> {
    /// Create a new session token service wrapping the given service.
    pub fn new(inner: S, token: impl Into<String>) -> Self {
        Self {
            inner,
            token: Arc::from(token.into()),
        }
    }
}

impl<S> Service<Request<Bytes>> for SessionToken<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>,
    S::Future: Send + 'static,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        let has_token = request
            .headers()
            .keys()
            .any(|name| name.eq_ignore_ascii_case(SESSION_TOKEN_HEADER));
        if !has_token {
            request
                .headers_mut()
                .insert(SESSION_TOKEN_HEADER.to_string(), self.token.to_string());
        }

        Box::pin(self.inner.call(request))
    }
}
