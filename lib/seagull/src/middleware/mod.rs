//! Tower middleware layers for the seagull transport.
//!
//! Layers wrap the [`HyperClient`](crate::HyperClient) service and see every
//! request after a host has been chosen. The first layer added to the
//! builder is the first to process requests.
//!
//! # Available Layers
//!
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`
//! - [`SessionTokenLayer`] - Stamps a server token on requests that carry none
//!
//! # Example
//!
//! ```ignore
//! use seagull::HyperClient;
//! use seagull::middleware::SessionTokenLayer;
//!
//! let client = HyperClient::builder()
//!     .with_logging()
//!     .layer(SessionTokenLayer::new("server-token"))
//!     .build();
//! ```

mod logging;
mod session_token;

pub use logging::{LogLevel, Logging, LoggingLayer};
pub use session_token::{SessionToken, SessionTokenLayer};

pub use tower::{Layer, ServiceBuilder};
