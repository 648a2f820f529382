//! Network service traits.
//!
//! [`NetworkService`] is the one seam every stage of the pipeline implements:
//! the concrete executor ([`crate::BasicNetworkService`]) and the decorators
//! ([`crate::ModifyRequestNetworkService`], [`crate::RetryNetworkService`])
//! are interchangeable behind it, so callers compose stages by wrapping.
//!
//! The primitive operation works at the [`NetworkError`] level; mapping into
//! the caller's error type is one of the derived projections on
//! [`NetworkServiceExt`], applied once at the outer boundary. That is what
//! lets a retry decorator in the middle of the chain consult the error
//! taxonomy before the mapping happens.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gantry::prelude::*;
//!
//! let service = BasicNetworkService::new(HyperTransport::new());
//! let task = Arc::new(ContainerNetworkTask::new());
//!
//! let train: Train = service.fetch(resource, Arc::clone(&task)).await?;
//! // ...or cancel from elsewhere: task.cancel();
//! ```

use std::future::Future;
use std::sync::Arc;

use gantry_core::{NetworkError, Resource, ResponseMetadata};

use crate::ContainerNetworkTask;

/// Executes a [`Resource`] and classifies the outcome.
///
/// Guarantees: exactly one terminal outcome per call, and the underlying
/// transport call is issued immediately on invocation - there is no implicit
/// batching or debouncing.
pub trait NetworkService: Send + Sync {
    /// Execute the resource's request and classify the raw outcome.
    ///
    /// The error is the unmapped [`NetworkError`]; use
    /// [`NetworkServiceExt::fetch_with_response`] to get the resource's own
    /// error type.
    ///
    /// # Errors
    ///
    /// Returns the classified [`NetworkError`] for any failing outcome.
    fn fetch_classified<M, E>(
        &self,
        resource: Resource<M, E>,
        task: Arc<ContainerNetworkTask>,
    ) -> impl Future<Output = Result<(M, ResponseMetadata), NetworkError>> + Send
    where
        M: Send + 'static,
        E: Send + 'static;
}

/// Derived operations on [`NetworkService`] - pure projections of the one
/// canonical result.
pub trait NetworkServiceExt: NetworkService {
    /// Fetch the resource, returning the parsed model together with the
    /// response metadata. Failures are mapped through the resource's error
    /// mapper.
    ///
    /// Clears the task handle's target once the call reaches a terminal
    /// state.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for any failing outcome.
    fn fetch_with_response<M, E>(
        &self,
        resource: Resource<M, E>,
        task: Arc<ContainerNetworkTask>,
    ) -> impl Future<Output = Result<(M, ResponseMetadata), E>> + Send
    where
        M: Send + 'static,
        E: Send + 'static,
    {
        let map_error = resource.error_mapper();
        async move {
            let result = self.fetch_classified(resource, Arc::clone(&task)).await;
            task.clear();
            result.map_err(|error| map_error(error))
        }
    }

    /// Fetch the resource, discarding the response metadata.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for any failing outcome.
    fn fetch<M, E>(
        &self,
        resource: Resource<M, E>,
        task: Arc<ContainerNetworkTask>,
    ) -> impl Future<Output = Result<M, E>> + Send
    where
        M: Send + 'static,
        E: Send + 'static,
    {
        async move {
            self.fetch_with_response(resource, task)
                .await
                .map(|(model, _)| model)
        }
    }

    /// Fetch the resource and hand the result to a completion callback.
    fn fetch_with_callback<M, E, F>(
        &self,
        resource: Resource<M, E>,
        task: Arc<ContainerNetworkTask>,
        on_completion: F,
    ) -> impl Future<Output = ()> + Send
    where
        M: Send + 'static,
        E: Send + 'static,
        F: FnOnce(Result<M, E>) + Send,
    {
        async move {
            on_completion(self.fetch(resource, task).await);
        }
    }
}

impl<S: NetworkService> NetworkServiceExt for S {}
