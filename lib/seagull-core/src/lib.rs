//! Core types and traits for the seagull metadata client.
//!
//! This crate provides the transport-agnostic pieces of a call:
//! - [`HostSpec`] and [`HostLocator`] - Host discovery
//! - [`RequestSpec`] and [`Request`] - What to send, before and after a host is chosen
//! - [`Response`] - HTTP response type
//! - [`StatusHandlers`] - Status-code keyed response handlers
//! - [`HttpClient`] - Transport trait for HTTP execution
//! - [`Error`], [`PreconditionError`] and [`Result`] - Error handling
//! - [`Method`] - HTTP method enum

mod body;
mod client;
mod error;
mod host;
mod method;
pub mod prelude;
mod request;
mod response;
mod status;

pub use body::{from_json, to_json};
pub use client::HttpClient;
pub use error::{Error, NO_HOSTS_STATUS, PreconditionError, Result, require};
pub use host::{HostLocator, HostSpec, StaticHosts};
pub use method::Method;
pub use request::{Request, RequestSpec};
pub use response::Response;
pub use status::{StatusCodes, StatusHandler, StatusHandlers, absent, parse_json};

// Re-export http crate types for status codes
pub use http::StatusCode;
