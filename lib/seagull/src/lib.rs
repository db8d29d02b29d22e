//! Client for the Tidepool metadata service ("seagull").
//!
//! The service holds per-user JSON documents: a profile, group memberships,
//! private pairs and arbitrary named collections. Its address is discovered
//! at call time through a [`HostLocator`].
//!
//! # Example
//!
//! ```ignore
//! use seagull::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Profile {
//!     #[serde(rename = "fullName")]
//!     full_name: String,
//! }
//!
//! let hosts = StaticHosts::new([HostSpec::new("https", "api.tidepool.org")]);
//! let client = MetadataClient::new(hosts, ClientConfig::new("/metadata", true));
//!
//! let profile: Option<Profile> = client
//!     .get_profile("1234", &session_token)?
//!     .send()
//!     .await?;
//! ```

mod client;
mod config;
mod connector;
mod metadata;
pub mod middleware;
pub mod prelude;
mod request_builder;
#[cfg(test)]
mod test_support;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, TransportConfig};
pub use metadata::MetadataClient;
pub use request_builder::{RequestBuilder, SESSION_TOKEN_HEADER};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use seagull_core::{
    Error, HostLocator, HostSpec, HttpClient, Method, NO_HOSTS_STATUS, PreconditionError, Request,
    RequestSpec, Response, Result, StaticHosts, StatusCodes, StatusHandler, StatusHandlers, absent,
    from_json, parse_json, require, to_json,
};

// Re-export http types for status codes
pub use seagull_core::StatusCode;

// Re-export url, used by `HostSpec::from_url`
pub use url;
