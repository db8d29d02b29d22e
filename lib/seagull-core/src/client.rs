//! HTTP transport trait.
//!
//! [`HttpClient`] is the single capability the dispatch needs from the
//! network: execute one request, produce one outcome. The default
//! implementation lives in the `seagull` crate; tests substitute doubles.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// Implementations must honor [`Request::verify_tls`] for HTTPS URLs and
/// must not retry on their own.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// Any status code is a response, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails at the transport level:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).execute(request)
    }
}

impl<C: HttpClient> HttpClient for &C {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).execute(request)
    }
}
