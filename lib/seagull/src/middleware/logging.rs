//! Request/response logging middleware.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result, SESSION_TOKEN_HEADER};

/// Layer that logs every metadata call going over the wire.
///
/// # Example
///
/// ```ignore
/// use seagull::middleware::LoggingLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(LoggingLayer::new())
///     .service(client);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level, with headers.
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a new logging layer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that logs at debug level.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Level this layer logs at.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Logging<S> {
    /// Create a new logging service wrapping the given service.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            level: LogLevel::Info,
        }
    }
}

/// Headers safe to print: the session token value is masked.
fn redacted(headers: &HashMap<String, String>) -> HashMap<&str, &str> {
    headers
        .iter()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case(SESSION_TOKEN_HEADER) {
                (name.as_str(), "<redacted>")
            } else {
                (name.as_str(), value.as_str())
            }
        })
        .collect()
}

impl<S> Service<Request<Bytes>> for Logging<S>
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

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let span = span!(
            Level::INFO,
            "metadata_request",
            method = %request.method(),
            url = %request.url()
        );
        match self.level {
            LogLevel::Debug => debug!(
                parent: &span,
                verify_tls = request.verify_tls(),
                headers = ?redacted(request.headers()),
                "sending request"
            ),
            LogLevel::Info => info!(parent: &span, "sending request"),
        }

        let call = self.inner.call(request);
        Box::pin(
            async move {
                let started = Instant::now();
                let result = call.await;
                log_outcome(&result, started);
                result
            }
            .instrument(span),
        )
    }
}

fn log_outcome(result: &Result<Response<Bytes>>, started: Instant) {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        // 404 is an ordinary answer for metadata lookups
        Ok(response) if response.is_success() || response.is_not_found() => {
            info!(status = response.status(), elapsed_ms, "request completed");
        }
        Ok(response) => {
            warn!(status = response.status(), elapsed_ms, "service answered with an error status");
        }
        Err(err) => warn!(error = %err, elapsed_ms, "request failed"),
    }
}
