//! Core types for the gantry resource-fetching pipeline.
//!
//! This crate provides the pure half of gantry:
//! - [`Method`], [`Request`] and [`RequestBuilder`] - transport-level request
//!   descriptors with pure rewriting helpers
//! - [`ResponseMetadata`] and [`LoadOutcome`] - transport response data
//! - [`NetworkError`], [`TransportError`] - the error taxonomy
//! - [`Resource`] - request + parse function + error mapper, as a value
//! - [`classify`] - the response classifier
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)
//!
//! Nothing here performs I/O; execution lives in the `gantry` crate.

mod body;
mod classify;
mod error;
mod method;
pub mod prelude;
mod request;
mod resource;
mod response;

pub use body::{from_json, to_form, to_json, to_query_string};
pub use classify::classify;
pub use error::{BuildResult, JsonDecodeError, NetworkError, ParseError, TransportError};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use resource::Resource;
pub use response::{LoadOutcome, ResponseMetadata};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
