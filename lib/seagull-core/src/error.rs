//! Error types for seagull.
//!
//! Two channels carry failures:
//! - [`PreconditionError`] is returned synchronously while a call is being
//!   prepared, before any I/O happens.
//! - [`Error`] is returned by the dispatch itself: host resolution, the
//!   transport, and responses without a registered status handler.

use derive_more::{Display, Error, From};

/// A required argument was missing or empty.
///
/// Raised while a metadata call is being prepared, never by the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("{message}")]
pub struct PreconditionError {
    message: &'static str,
}

impl PreconditionError {
    /// Create a precondition error with the given message.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }

    /// The message describing the missing argument.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

/// Reject a missing (empty) required argument.
///
/// # Errors
///
/// Returns a [`PreconditionError`] carrying `message` if `value` is empty.
///
/// # Example
///
/// ```
/// use seagull_core::require;
///
/// assert!(require("user-1", "Must specify a userId").is_ok());
/// assert!(require("", "Must specify a userId").is_err());
/// ```
pub fn require(value: &str, message: &'static str) -> std::result::Result<(), PreconditionError> {
    if value.is_empty() {
        Err(PreconditionError::new(message))
    } else {
        Ok(())
    }
}

/// Everything that can go wrong once a call is dispatched.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The service answered with a status the call has no handler for.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// Status of the answer.
        status: u16,
        /// What went wrong; for unhandled statuses, the quoted body.
        message: String,
        /// Raw body of the answer, when there was one.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// The host locator knows no live metadata host.
    #[display("No hosts found")]
    #[from(skip)]
    NoHosts,

    /// The service could not be reached.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// The TLS handshake failed.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// No answer within the transport timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The request could not be turned into valid HTTP.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// A required argument was missing.
    #[display("precondition failed: {_0}")]
    #[from]
    Precondition(PreconditionError),

    /// An outgoing body could not be encoded.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// A document did not have the expected shape.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// Where in the document decoding stopped, e.g. `members[2]`.
        path: String,
        /// What serde reported.
        message: String,
    },

    /// Host, path prefix and path do not form a URL.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result of a dispatched call.
pub type Result<T> = std::result::Result<T, Error>;

/// Status code reported for [`Error::NoHosts`].
pub const NO_HOSTS_STATUS: u16 = 503;

impl Error {
    /// An HTTP error without body, for handlers rejecting an answer.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// The error for a status nobody registered a handler for.
    ///
    /// The message is the `Debug` rendering of the body decoded as text, so
    /// quotes and control characters stay visible in logs.
    #[must_use]
    pub fn unhandled_status(status: u16, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: format!("{:?}", String::from_utf8_lossy(&body)),
            body: Some(body),
        }
    }

    /// See [`Error::Connection`].
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// See [`Error::Tls`].
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// See [`Error::InvalidRequest`].
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// See [`Error::JsonDeserialization`].
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the transport timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Whether the service could not be reached.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether host discovery came back empty.
    #[must_use]
    pub const fn is_no_hosts(&self) -> bool {
        matches!(self, Self::NoHosts)
    }

    /// Status code carried by this error; [`Error::NoHosts`] reports `503`.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NoHosts => Some(NO_HOSTS_STATUS),
            _ => None,
        }
    }

    /// Whether the status is 5xx, [`Error::NoHosts`] included.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Raw body of an unhandled answer.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}
