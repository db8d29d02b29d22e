//! What came back from the service.
//!
//! Any status is a [`Response`]; only the status table decides whether it is
//! a success for the call at hand.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;

/// Status, headers and fully read body of one answer.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Assemble a response; header names are expected in lowercase.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// All headers, keyed by lowercase name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header value, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| self.headers.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// The body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Take the body, dropping status and headers.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// Whether the service reported the document as absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl Response<Bytes> {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonDeserialization`] with the path of the
    /// offending field.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(&self.body)
    }

    /// The body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Fails if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// The body as text, invalid sequences replaced by U+FFFD.
    #[must_use]
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
