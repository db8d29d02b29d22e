//! HTTP method types.

use derive_more::Display;

/// HTTP request method. Requests default to [`Method::Get`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method.
    #[default]
    #[display("GET")]
    Get,
    /// POST method.
    #[display("POST")]
    Post,
    /// PUT method.
    #[display("PUT")]
    Put,
    /// DELETE method.
    #[display("DELETE")]
    Delete,
    /// PATCH method.
    #[display("PATCH")]
    Patch,
    /// HEAD method.
    #[display("HEAD")]
    Head,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
            Method::Head => Self::HEAD,
        }
    }
}
