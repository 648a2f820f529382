//! Concrete network service over a transport collaborator.

use std::sync::Arc;
use std::time::Instant;

use gantry_core::{NetworkError, Resource, ResponseMetadata, classify};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{ContainerNetworkTask, NetworkService, Transport};

/// Executes resources against a [`Transport`] and classifies the outcomes.
///
/// One attempt per call: retrying and request rewriting are layered on top
/// with the decorator services.
#[derive(Debug, Clone)]
pub struct BasicNetworkService<T> {
    transport: T,
}

impl<T> BasicNetworkService<T> {
    /// Creates a service over the given transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> NetworkService for BasicNetworkService<T>
where
    T: Transport,
{
    async fn fetch_classified<M, E>(
        &self,
        resource: Resource<M, E>,
        task: Arc<ContainerNetworkTask>,
    ) -> Result<(M, ResponseMetadata), NetworkError>
    where
        M: Send + 'static,
        E: Send + 'static,
    {
        let method = resource.request().method();
        let url = resource.request().url().to_string();
        let span = span!(Level::INFO, "fetch_resource", %method, %url);

        async move {
            let result = async {
                if task.is_cancelled() {
                    debug!("call cancelled before the transport was invoked");
                    return Err(NetworkError::Cancelled);
                }

                let start = Instant::now();
                let outcome = self.transport.load(resource.request().clone(), &task).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                // A late outcome on a cancelled call is discarded, not delivered.
                if task.is_cancelled() {
                    debug!(elapsed_ms, "discarding outcome of cancelled call");
                    return Err(NetworkError::Cancelled);
                }

                let result = classify(&resource, outcome);
                match &result {
                    Ok((_, response)) => {
                        info!(status = response.status(), elapsed_ms, "request completed");
                    }
                    Err(error) => {
                        warn!(%error, elapsed_ms, "request failed");
                    }
                }
                result
            }
            .await;

            // Terminal state: the handle must not keep the finished transport
            // task alive.
            task.clear();
            result
        }
        .instrument(span)
        .await
    }
}
