//! Prelude module for convenient imports.
//!
//! ```ignore
//! use seagull::prelude::*;
//! ```

pub use crate::{
    ClientConfig, Error, HostLocator, HostSpec, HttpClient, HyperClient, MetadataClient, Method,
    PreconditionError, RequestBuilder, Response, Result, StaticHosts, StatusCode,
};
pub use serde::{Deserialize, Serialize};
