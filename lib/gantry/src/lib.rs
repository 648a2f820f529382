//! Resource-fetching pipeline over HTTP.
//!
//! A [`Resource`] pairs a request with a parse function and an error mapper.
//! A [`NetworkService`] executes resources: the concrete
//! [`BasicNetworkService`] drives a [`Transport`] and classifies the outcome,
//! while [`RetryNetworkService`] and [`ModifyRequestNetworkService`] decorate
//! any service with retry orchestration and request rewriting. Every call
//! hands back its result through a cancellable [`ContainerNetworkTask`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use gantry::prelude::*;
//!
//! #[derive(serde::Deserialize)]
//! struct Train {
//!     name: String,
//! }
//!
//! # async fn run() -> Result<(), NetworkError> {
//! let url = url::Url::parse("https://api.example.com/train").expect("valid URL");
//! let request = Request::builder(Method::Get, url).build();
//! let resource: Resource<Train, NetworkError> =
//!     Resource::json(request, std::convert::identity);
//!
//! let service = BasicNetworkService::new(HyperTransport::new());
//! let task = Arc::new(ContainerNetworkTask::new());
//! let train = service.fetch(resource, task).await?;
//! println!("{}", train.name);
//! # Ok(())
//! # }
//! ```

mod basic;
mod config;
mod decorator;
pub mod prelude;
mod service;
mod task;
mod transport;

#[cfg(test)]
mod test_support;

pub use self::basic::BasicNetworkService;
pub use self::config::{ClientConfig, ClientConfigBuilder};
pub use self::decorator::{
    ModifyRequestNetworkService, RequestModification, RetryNetworkService, RetryPolicy,
};
pub use self::service::{NetworkService, NetworkServiceExt};
pub use self::task::{ContainerNetworkTask, NetworkTask};
pub use self::transport::{HyperTransport, Transport};

pub use gantry_core::{
    BuildResult, JsonDecodeError, LoadOutcome, Method, NetworkError, ParseError, Request,
    RequestBuilder, Resource, ResponseMetadata, TransportError, from_json, to_form, to_json,
    to_query_string,
};
pub use gantry_core::{StatusCode, header};

// Re-export crates callers need to build requests
pub use url;
