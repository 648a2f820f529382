//! Prelude module for convenient imports.
//!
//! ```ignore
//! use gantry::prelude::*;
//! ```

pub use crate::{
    BasicNetworkService, ClientConfig, ContainerNetworkTask, HyperTransport, LoadOutcome, Method,
    ModifyRequestNetworkService, NetworkError, NetworkService, NetworkServiceExt, NetworkTask,
    Request, RequestBuilder, Resource, ResponseMetadata, RetryNetworkService, RetryPolicy,
    Transport, TransportError,
};
