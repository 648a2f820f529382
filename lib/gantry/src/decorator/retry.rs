//! Retry decorator.
//!
//! [`RetryNetworkService`] re-issues failed fetches according to a shared
//! [`RetryPolicy`]. Attempts are strictly sequential: a new attempt starts
//! only after the previous one produced a terminal outcome, and never after
//! the call's task handle was cancelled. The error returned to the caller is
//! always the one from the last attempt.

use std::sync::Arc;
use std::time::Duration;

use gantry_core::{NetworkError, Resource, ResponseMetadata};
use tracing::debug;

use crate::{ContainerNetworkTask, NetworkService};

/// Rules governing retry behavior.
///
/// `number_of_retries` counts *additional* attempts after the first: a policy
/// with `number_of_retries = 2` issues at most 3 transport calls. The
/// `should_retry` predicate is evaluated fresh on every failure and must be
/// side-effect-free; one policy instance is typically shared across many
/// concurrent calls.
#[derive(Clone)]
pub struct RetryPolicy {
    number_of_retries: u32,
    idle_interval: Duration,
    should_retry: Arc<dyn Fn(&NetworkError) -> bool + Send + Sync>,
}

impl RetryPolicy {
    /// Creates a policy with the default predicate: retry server errors and
    /// transport-level request failures, never cancellations or client-side
    /// failures.
    ///
    /// The predicate only sees the classified error. Re-issuing a request
    /// with side effects is the caller's call; gate the policy on
    /// [`gantry_core::Method::is_idempotent`] via [`Self::with_should_retry`]
    /// when a resource uses POST or PATCH.
    #[must_use]
    pub fn new(number_of_retries: u32, idle_interval: Duration) -> Self {
        Self {
            number_of_retries,
            idle_interval,
            should_retry: Arc::new(Self::default_should_retry),
        }
    }

    /// Replaces the retry predicate.
    #[must_use]
    pub fn with_should_retry(
        mut self,
        should_retry: impl Fn(&NetworkError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.should_retry = Arc::new(should_retry);
        self
    }

    /// Maximum number of additional attempts after the first.
    #[must_use]
    pub const fn number_of_retries(&self) -> u32 {
        self.number_of_retries
    }

    /// Idle wait between a failed attempt and the next one.
    #[must_use]
    pub const fn idle_interval(&self) -> Duration {
        self.idle_interval
    }

    fn default_should_retry(error: &NetworkError) -> bool {
        match error {
            NetworkError::Server { .. } => true,
            NetworkError::Request(cause) => !cause.is_cancelled(),
            _ => false,
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("number_of_retries", &self.number_of_retries)
            .field("idle_interval", &self.idle_interval)
            .finish_non_exhaustive()
    }
}

/// Decorator that retries failed fetches against its inner service.
///
/// Each retry re-invokes the full inner chain, so request rewrites applied by
/// an inner [`crate::ModifyRequestNetworkService`] run fresh per attempt.
#[derive(Debug, Clone)]
pub struct RetryNetworkService<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryNetworkService<S> {
    /// Creates a retrying decorator with the given policy.
    ///
    /// The policy is fixed for the lifetime of the decorator.
    pub const fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<S> NetworkService for RetryNetworkService<S>
where
    S: NetworkService,
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
        let mut retries_left = self.policy.number_of_retries;

        loop {
            let result = self
                .inner
                .fetch_classified(resource.clone(), Arc::clone(&task))
                .await;

            // Once cancelled, no result is delivered, not even a success
            // that arrived in the meantime.
            if task.is_cancelled() {
                return Err(NetworkError::Cancelled);
            }

            let error = match result {
                Ok(success) => return Ok(success),
                Err(error) => error,
            };

            if retries_left == 0 || !(self.policy.should_retry)(&error) {
                return Err(error);
            }
            retries_left -= 1;

            debug!(
                %error,
                retries_left,
                idle_ms = u64::try_from(self.policy.idle_interval.as_millis()).unwrap_or(u64::MAX),
                "retrying failed request"
            );
            tokio::time::sleep(self.policy.idle_interval).await;

            // Cancellation during the idle wait must not start a new attempt.
            if task.is_cancelled() {
                return Err(NetworkError::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;
    use gantry_core::{LoadOutcome, ResponseMetadata, TransportError};

    use super::*;
    use crate::test_support::{StubTransport, train_resource};
    use crate::{BasicNetworkService, NetworkTask};

    fn server_error(status: u16) -> LoadOutcome {
        LoadOutcome::success(
            ResponseMetadata::new(status, HashMap::new()),
            Bytes::from_static(b"boom"),
        )
    }

    fn ok_outcome() -> LoadOutcome {
        LoadOutcome::success(
            ResponseMetadata::new(200, HashMap::new()),
            Bytes::from_static(br#"{"name":"ICE"}"#),
        )
    }

    fn service(
        outcomes: impl IntoIterator<Item = LoadOutcome>,
        policy: RetryPolicy,
    ) -> RetryNetworkService<BasicNetworkService<StubTransport>> {
        RetryNetworkService::new(BasicNetworkService::new(StubTransport::new(outcomes)), policy)
    }

    #[tokio::test]
    async fn success_on_first_attempt_makes_one_call() {
        let service = service(
            [ok_outcome()],
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let task = Arc::new(ContainerNetworkTask::new());

        service
            .fetch_classified(train_resource(), task)
            .await
            .expect("success");

        assert_eq!(service.inner.transport().loads(), 1);
    }

    #[tokio::test]
    async fn exhausts_budget_and_returns_last_error() {
        // Three consecutive server errors with two retries allowed: exactly
        // three calls, and the error is the one from the last attempt.
        let service = service(
            [server_error(500), server_error(502), server_error(503)],
            RetryPolicy::new(2, Duration::from_millis(1)),
        );
        let task = Arc::new(ContainerNetworkTask::new());

        let err = service
            .fetch_classified(train_resource(), task)
            .await
            .expect_err("exhausted");

        assert_eq!(service.inner.transport().loads(), 3);
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn always_true_predicate_allows_exactly_n_extra_attempts() {
        let outcomes = (0..10).map(|_| LoadOutcome::empty());
        let policy = RetryPolicy::new(4, Duration::from_millis(1)).with_should_retry(|_| true);
        let service = service(outcomes, policy);
        let task = Arc::new(ContainerNetworkTask::new());

        let err = service
            .fetch_classified(train_resource(), task)
            .await
            .expect_err("still failing");

        assert_eq!(service.inner.transport().loads(), 5);
        assert!(matches!(err, NetworkError::Unknown));
    }

    #[tokio::test]
    async fn recovers_when_a_later_attempt_succeeds() {
        let service = service(
            [server_error(503), ok_outcome()],
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let task = Arc::new(ContainerNetworkTask::new());

        let (train, response) = service
            .fetch_classified(train_resource(), task)
            .await
            .expect("second attempt succeeds");

        assert_eq!(train.name, "ICE");
        assert_eq!(response.status(), 200);
        assert_eq!(service.inner.transport().loads(), 2);
    }

    #[tokio::test]
    async fn veto_by_predicate_surfaces_original_error_unchanged() {
        let service = service(
            [server_error(500), server_error(503)],
            RetryPolicy::new(3, Duration::from_millis(1)).with_should_retry(|_| false),
        );
        let task = Arc::new(ContainerNetworkTask::new());

        let err = service
            .fetch_classified(train_resource(), task)
            .await
            .expect_err("vetoed");

        assert_eq!(service.inner.transport().loads(), 1);
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn zero_retries_means_a_single_call() {
        let service = service(
            [server_error(500)],
            RetryPolicy::new(0, Duration::from_millis(1)),
        );
        let task = Arc::new(ContainerNetworkTask::new());

        service
            .fetch_classified(train_resource(), task)
            .await
            .expect_err("fails");

        assert_eq!(service.inner.transport().loads(), 1);
    }

    #[tokio::test]
    async fn default_predicate_does_not_retry_client_errors() {
        let service = service(
            [LoadOutcome::success(
                ResponseMetadata::new(404, HashMap::new()),
                Bytes::new(),
            )],
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let task = Arc::new(ContainerNetworkTask::new());

        let err = service
            .fetch_classified(train_resource(), task)
            .await
            .expect_err("client error");

        assert!(matches!(err, NetworkError::Client { .. }));
        assert_eq!(service.inner.transport().loads(), 1);
    }

    #[tokio::test]
    async fn default_predicate_retries_transport_failures() {
        let service = service(
            [
                LoadOutcome::failure(TransportError::connection("reset")),
                ok_outcome(),
            ],
            RetryPolicy::new(1, Duration::from_millis(1)),
        );
        let task = Arc::new(ContainerNetworkTask::new());

        service
            .fetch_classified(train_resource(), task)
            .await
            .expect("recovered");

        assert_eq!(service.inner.transport().loads(), 2);
    }

    #[tokio::test]
    async fn policies_can_gate_retries_on_request_idempotency() {
        use crate::test_support::Train;
        use gantry_core::{Method, Request};

        let url = url::Url::parse("https://api.example.com/train").expect("valid URL");
        let request = Request::builder(Method::Post, url).build();
        let resource: Resource<Train, NetworkError> =
            Resource::json(request, std::convert::identity);

        let idempotent = resource.request().method().is_idempotent();
        let policy = RetryPolicy::new(3, Duration::from_millis(1))
            .with_should_retry(move |error| idempotent && error.is_server_error());
        let service = service([server_error(500), server_error(500)], policy);
        let task = Arc::new(ContainerNetworkTask::new());

        let err = service
            .fetch_classified(resource, task)
            .await
            .expect_err("server error");

        // POST is not idempotent, so the 500 is surfaced after one call.
        assert_eq!(err.status(), Some(500));
        assert_eq!(service.inner.transport().loads(), 1);
    }

    #[tokio::test]
    async fn cancel_during_idle_wait_prevents_the_next_attempt() {
        let policy =
            RetryPolicy::new(3, Duration::from_millis(100)).with_should_retry(|_| true);
        let service = Arc::new(service([server_error(500)], policy));
        let task = Arc::new(ContainerNetworkTask::new());

        let call = {
            let service = Arc::clone(&service);
            let task = Arc::clone(&task);
            tokio::spawn(async move { service.fetch_classified(train_resource(), task).await })
        };

        // Let the first attempt fail and the idle wait begin, then cancel.
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.cancel();

        let err = call.await.expect("join").expect_err("cancelled");
        assert!(matches!(err, NetworkError::Cancelled));
        assert_eq!(service.inner.transport().loads(), 1);
    }

    #[tokio::test]
    async fn shared_policy_serves_concurrent_calls() {
        let policy = RetryPolicy::new(1, Duration::from_millis(1));
        let first = Arc::new(service([server_error(500), ok_outcome()], policy.clone()));
        let second = Arc::new(service([ok_outcome()], policy));

        let task_a = Arc::new(ContainerNetworkTask::new());
        let task_b = Arc::new(ContainerNetworkTask::new());

        let (a, b) = tokio::join!(
            first.fetch_classified(train_resource(), task_a),
            second.fetch_classified(train_resource(), task_b),
        );

        a.expect("first call recovers");
        b.expect("second call succeeds");
        assert_eq!(first.inner.transport().loads(), 2);
        assert_eq!(second.inner.transport().loads(), 1);
    }
}
