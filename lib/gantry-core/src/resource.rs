//! Resource descriptions.
//!
//! A [`Resource`] pairs a request descriptor with a parse function and an
//! error-mapping function. It is a pure value: constructing one performs no
//! I/O, and executing it is the job of a `NetworkService`.
//!
//! # Example
//!
//! ```
//! use gantry_core::{Method, NetworkError, Request, Resource};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Train { name: String }
//!
//! let request = Request::builder(Method::Get, "https://api.example.com/train".parse().unwrap())
//!     .build();
//! let resource: Resource<Train, NetworkError> = Resource::json(request, std::convert::identity);
//! ```

use std::sync::Arc;

use bytes::Bytes;

use crate::{NetworkError, ParseError, Request, from_json};

/// Description of a remote resource: what to fetch, how to parse it, and how
/// to map classified errors into the caller's error type.
///
/// `parse` must be deterministic for identical bytes; `map_error` must be
/// total over the [`NetworkError`] taxonomy. Both are shared behind `Arc`, so
/// cloning a resource is cheap and retry orchestration can re-use it per
/// attempt.
pub struct Resource<M, E> {
    request: Request,
    parse: Arc<dyn Fn(&Bytes) -> Result<M, ParseError> + Send + Sync>,
    map_error: Arc<dyn Fn(NetworkError) -> E + Send + Sync>,
}

impl<M, E> Resource<M, E> {
    /// Creates a resource from a request, a parse function, and an error
    /// mapper.
    pub fn new(
        request: Request,
        parse: impl Fn(&Bytes) -> Result<M, ParseError> + Send + Sync + 'static,
        map_error: impl Fn(NetworkError) -> E + Send + Sync + 'static,
    ) -> Self {
        Self {
            request,
            parse: Arc::new(parse),
            map_error: Arc::new(map_error),
        }
    }

    /// The request descriptor.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Run the parse function on a payload.
    ///
    /// # Errors
    ///
    /// Returns the parse function's error.
    pub fn parse(&self, data: &Bytes) -> Result<M, ParseError> {
        (self.parse)(data)
    }

    /// Map a classified error into the caller's error type.
    pub fn map_error(&self, error: NetworkError) -> E {
        (self.map_error)(error)
    }

    /// Shared handle to the error mapper, for use after the resource has been
    /// consumed by an execution pipeline.
    #[must_use]
    pub fn error_mapper(&self) -> Arc<dyn Fn(NetworkError) -> E + Send + Sync> {
        Arc::clone(&self.map_error)
    }

    /// Returns a resource with the request rewritten by a pure transform.
    ///
    /// Parse and error-mapping functions are untouched.
    #[must_use]
    pub fn map_request(self, transform: impl FnOnce(Request) -> Request) -> Self {
        Self {
            request: transform(self.request),
            parse: self.parse,
            map_error: self.map_error,
        }
    }
}

impl<M, E> Resource<M, E>
where
    M: serde::de::DeserializeOwned,
{
    /// Creates a resource that parses its payload as JSON.
    pub fn json(
        request: Request,
        map_error: impl Fn(NetworkError) -> E + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            request,
            |data| from_json(data).map_err(|e| Box::new(e) as ParseError),
            map_error,
        )
    }
}

impl<M, E> Clone for Resource<M, E> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            parse: Arc::clone(&self.parse),
            map_error: Arc::clone(&self.map_error),
        }
    }
}

impl<M, E> std::fmt::Debug for Resource<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
