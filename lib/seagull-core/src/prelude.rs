//! Prelude module for convenient imports.
//!
//! ```ignore
//! use seagull_core::prelude::*;
//! ```

pub use crate::{
    Error, HostLocator, HostSpec, HttpClient, Method, PreconditionError, Request, RequestSpec,
    Response, Result, StaticHosts, StatusHandlers, from_json, to_json,
};
