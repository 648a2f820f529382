//! Transport collaborator boundary and the hyper-based implementation.
//!
//! The pipeline never speaks HTTP itself: it hands a [`Request`] to a
//! [`Transport`] and gets back the raw [`LoadOutcome`] triple for the
//! classifier. [`HyperTransport`] is the production implementation, a pooled
//! hyper-util client over a rustls connector.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tokio::sync::watch;

use crate::{
    ClientConfig, ContainerNetworkTask, LoadOutcome, NetworkTask, Request, ResponseMetadata,
    TransportError,
};

/// Asynchronous transport collaborator.
///
/// `load` must register a cancellable task for the exchange into the
/// container before doing I/O, so external `cancel`/`suspend`/`resume` calls
/// reach the in-flight attempt. It reports failure through the outcome value
/// rather than a `Result`; classification of the triple is the caller's job.
pub trait Transport: Send + Sync {
    /// Execute one exchange for the request.
    fn load(
        &self,
        request: Request,
        task: &ContainerNetworkTask,
    ) -> impl Future<Output = LoadOutcome> + Send;
}

// ============================================================================
// Cancellation signal
// ============================================================================

/// Per-exchange task registered by [`HyperTransport`].
///
/// Cancel aborts the exchange. Resume is a no-op because the future starts
/// when polled; suspend is a no-op because a hyper exchange cannot be paused
/// mid-flight.
struct LoadSignal {
    cancel: watch::Sender<bool>,
}

impl LoadSignal {
    fn new() -> Self {
        Self {
            cancel: watch::Sender::new(false),
        }
    }

    async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl NetworkTask for LoadSignal {
    fn resume(&self) {}

    fn suspend(&self) {}

    fn cancel(&self) {
        self.cancel.send_replace(true);
    }
}

// ============================================================================
// Hyper transport
// ============================================================================

/// Transport implementation using hyper-util with connection pooling and TLS.
///
/// # Example
///
/// ```ignore
/// use gantry::{ClientConfig, HyperTransport};
///
/// let transport = HyperTransport::new();
/// let custom = HyperTransport::with_config(ClientConfig::builder()
///     .timeout(std::time::Duration::from_secs(5))
///     .build());
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(&config));

        Self { inner, config }
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a hyper request from a gantry request.
    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>, TransportError> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| TransportError::invalid_request(e.to_string()))
    }

    /// Extract response headers as a `HashMap`.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> TransportError {
        let msg = err.to_string();

        if err.is_connect() {
            return TransportError::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return TransportError::tls(msg);
        }

        TransportError::connection(msg)
    }

    /// Run the exchange to completion, mapping every failure into the outcome.
    async fn exchange(&self, request: http::Request<Full<Bytes>>) -> LoadOutcome {
        let response =
            match tokio::time::timeout(self.config.timeout, self.inner.request(request)).await {
                Err(_) => return LoadOutcome::failure(TransportError::Timeout),
                Ok(Err(e)) => return LoadOutcome::failure(Self::map_hyper_error(e)),
                Ok(Ok(response)) => response,
            };

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        match response.into_body().collect().await {
            Ok(collected) => LoadOutcome::success(
                ResponseMetadata::new(status, headers),
                collected.to_bytes(),
            ),
            Err(e) => LoadOutcome::failure(TransportError::connection(e.to_string())),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Transport for HyperTransport {
    async fn load(&self, request: Request, task: &ContainerNetworkTask) -> LoadOutcome {
        let signal = Arc::new(LoadSignal::new());
        task.assign(Arc::clone(&signal) as Arc<dyn NetworkTask>);

        // A container cancelled before this attempt must not reach the wire.
        if task.is_cancelled() {
            return LoadOutcome::failure(TransportError::Cancelled);
        }

        let hyper_request = match Self::build_hyper_request(request) {
            Ok(request) => request,
            Err(error) => return LoadOutcome::failure(error),
        };

        tokio::select! {
            () = signal.cancelled() => LoadOutcome::failure(TransportError::Cancelled),
            outcome = self.exchange(hyper_request) => outcome,
        }
    }
}

/// HTTPS connector with rustls, Mozilla roots, HTTP/1.1 and HTTP/2.
fn https_connector(config: &ClientConfig) -> HttpsConnector<HttpConnector> {
    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(config.connect_timeout));

    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http)
}
