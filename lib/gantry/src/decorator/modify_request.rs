//! Request-rewriting decorator.

use std::sync::Arc;

use gantry_core::{NetworkError, Request, Resource, ResponseMetadata};

use crate::{ContainerNetworkTask, NetworkService};

/// A pure request transform.
pub type RequestModification = Arc<dyn Fn(Request) -> Request + Send + Sync>;

/// Decorator that rewrites the resource's request before delegating.
///
/// Transforms are applied left to right; parse and error-mapping functions
/// are untouched. The decorator holds no per-call state - one request in,
/// one (possibly rewritten) request out.
///
/// # Example
///
/// ```ignore
/// use gantry::{BasicNetworkService, HyperTransport, ModifyRequestNetworkService};
///
/// let service = ModifyRequestNetworkService::new(
///     BasicNetworkService::new(HyperTransport::new()),
///     [Arc::new(|req: Request| req.with_header("Authorization", "Bearer token")) as _],
/// );
/// ```
#[derive(Clone)]
pub struct ModifyRequestNetworkService<S> {
    inner: S,
    modifications: Vec<RequestModification>,
}

impl<S> ModifyRequestNetworkService<S> {
    /// Creates a decorator applying the given transforms, in order, before
    /// every delegation.
    pub fn new(inner: S, modifications: impl IntoIterator<Item = RequestModification>) -> Self {
        Self {
            inner,
            modifications: modifications.into_iter().collect(),
        }
    }
}

impl<S> NetworkService for ModifyRequestNetworkService<S>
where
    S: NetworkService,
{
    async fn fetch_classified<M, E>(
        &self,
        resource: Resource<M, E>,
        task: std::sync::Arc<ContainerNetworkTask>,
    ) -> Result<(M, ResponseMetadata), NetworkError>
    where
        M: Send + 'static,
        E: Send + 'static,
    {
        let resource = resource.map_request(|request| {
            self.modifications
                .iter()
                .fold(request, |request, modify| modify(request))
        });
        self.inner.fetch_classified(resource, task).await
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for ModifyRequestNetworkService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifyRequestNetworkService")
            .field("inner", &self.inner)
            .field("modifications", &self.modifications.len())
            .finish()
    }
}
