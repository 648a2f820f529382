//! Prelude module for convenient imports.
//!
//! ```ignore
//! use gantry_core::prelude::*;
//! ```

pub use crate::{
    LoadOutcome, Method, NetworkError, Request, RequestBuilder, Resource, ResponseMetadata,
    TransportError, classify, from_json, to_form, to_json,
};
