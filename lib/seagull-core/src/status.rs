//! Status-code keyed response handlers.
//!
//! A call registers one handler per status code it understands. The response
//! is routed to the handler registered for its status; a status nobody
//! claimed becomes [`Error::Http`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Error, Response, Result};

/// Turns a response into the call's result.
pub type StatusHandler<T> = Arc<dyn Fn(&Response<Bytes>) -> Result<T> + Send + Sync>;

/// One status code or a group of them.
///
/// Implemented for `u16`, [`http::StatusCode`], arrays, slices and vectors of
/// `u16`, so `when_status(404, ..)` and `when_status([200, 201], ..)` both work.
pub trait StatusCodes {
    /// The codes, in registration order.
    fn into_codes(self) -> Vec<u16>;
}

impl StatusCodes for u16 {
    fn into_codes(self) -> Vec<u16> {
        vec![self]
    }
}

impl StatusCodes for http::StatusCode {
    fn into_codes(self) -> Vec<u16> {
        vec![self.as_u16()]
    }
}

impl<const N: usize> StatusCodes for [u16; N] {
    fn into_codes(self) -> Vec<u16> {
        self.to_vec()
    }
}

impl StatusCodes for &[u16] {
    fn into_codes(self) -> Vec<u16> {
        self.to_vec()
    }
}

impl StatusCodes for Vec<u16> {
    fn into_codes(self) -> Vec<u16> {
        self
    }
}

/// Map from status code to handler. At most one handler per code; the last
/// registration for a code wins.
pub struct StatusHandlers<T> {
    handlers: BTreeMap<u16, StatusHandler<T>>,
}

impl<T> StatusHandlers<T> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register `handler` for every code in `status`.
    pub fn insert<F>(&mut self, status: impl StatusCodes, handler: F)
    where
        F: Fn(&Response<Bytes>) -> Result<T> + Send + Sync + 'static,
    {
        let handler: StatusHandler<T> = Arc::new(handler);
        for code in status.into_codes() {
            self.handlers.insert(code, Arc::clone(&handler));
        }
    }

    /// Handler registered for `status`.
    #[must_use]
    pub fn get(&self, status: u16) -> Option<&StatusHandler<T>> {
        self.handlers.get(&status)
    }

    /// Whether a handler is registered for `status`.
    #[must_use]
    pub fn contains(&self, status: u16) -> bool {
        self.handlers.contains_key(&status)
    }

    /// Registered codes, ascending.
    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.handlers.keys().copied()
    }

    /// Number of registered codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route `response` to its handler.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns, or [`Error::Http`] with a
    /// diagnostic rendering of the body when no handler claims the status.
    pub fn handle(&self, response: Response<Bytes>) -> Result<T> {
        match self.handlers.get(&response.status()) {
            Some(handler) => handler(&response),
            None => Err(Error::unhandled_status(
                response.status(),
                response.into_body(),
            )),
        }
    }
}

impl<T> Default for StatusHandlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for StatusHandlers<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<T> fmt::Debug for StatusHandlers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// Handler that decodes the body as JSON.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] if the body is not a `T`.
pub fn parse_json<T: serde::de::DeserializeOwned>(response: &Response<Bytes>) -> Result<T> {
    response.json()
}

/// Handler for "nothing there": always `Ok(None)`.
///
/// # Errors
///
/// Never fails.
pub fn absent<T>(_response: &Response<Bytes>) -> Result<Option<T>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn response(status: u16, body: &'static str) -> Response<Bytes> {
        Response::new(status, HashMap::new(), Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn routes_to_registered_handler() {
        let mut handlers = StatusHandlers::new();
        handlers.insert(200, parse_json::<serde_json::Value>);

        let value = handlers
            .handle(response(200, r#"{"something":1}"#))
            .expect("handled");
        assert_eq!(value, serde_json::json!({"something": 1}));
    }

    #[test]
    fn unregistered_status_is_an_error() {
        let handlers: StatusHandlers<()> = StatusHandlers::new();

        let err = handlers
            .handle(response(500, "database on fire"))
            .expect_err("not handled");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), r#"HTTP error 500: "database on fire""#);
    }

    #[test]
    fn list_registers_every_code() {
        let mut handlers = StatusHandlers::new();
        handlers.insert([200, 201, 204], |_: &Response<Bytes>| Ok("ok"));

        assert_eq!(handlers.codes().collect::<Vec<_>>(), vec![200, 201, 204]);
        assert_eq!(handlers.handle(response(204, "")).expect("handled"), "ok");
    }

    #[test]
    fn last_registration_wins() {
        let mut handlers = StatusHandlers::new();
        handlers.insert(404, |_: &Response<Bytes>| Ok("first"));
        handlers.insert(vec![404, 410], |_: &Response<Bytes>| Ok("second"));

        assert_eq!(handlers.len(), 2);
        assert_eq!(handlers.handle(response(404, "")).expect("handled"), "second");
    }

    #[test]
    fn accepts_http_status_codes_and_slices() {
        let mut handlers = StatusHandlers::new();
        handlers.insert(http::StatusCode::NOT_FOUND, absent::<u8>);
        handlers.insert(&[409_u16, 412][..], |_: &Response<Bytes>| Ok(Some(1)));

        assert!(handlers.contains(404));
        assert!(handlers.contains(412));
        assert!(!handlers.contains(200));
        assert_eq!(handlers.handle(response(404, "")).expect("handled"), None);
    }

    #[test]
    fn handler_errors_pass_through() {
        let mut handlers = StatusHandlers::new();
        handlers.insert(200, parse_json::<Vec<String>>);

        let err = handlers
            .handle(response(200, "not json"))
            .expect_err("bad json");
        assert!(matches!(err, Error::JsonDeserialization { .. }));
    }

    #[test]
    fn debug_lists_codes() {
        let mut handlers = StatusHandlers::new();
        handlers.insert([404, 200], absent::<()>);
        assert_eq!(format!("{handlers:?}"), "{200, 404}");
        assert!(StatusHandlers::<()>::default().is_empty());
    }
}
