//! Shared helpers for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use gantry_core::{LoadOutcome, Method, NetworkError, Request, Resource};

use crate::{ContainerNetworkTask, Transport};

/// Sample model used across service tests.
#[derive(Debug, PartialEq, serde::Deserialize)]
pub struct Train {
    pub name: String,
}

/// A JSON resource for `/train` that keeps errors unmapped.
pub fn train_resource() -> Resource<Train, NetworkError> {
    let url = url::Url::parse("https://api.example.com/train").expect("valid URL");
    let request = Request::builder(Method::Get, url).build();
    Resource::json(request, std::convert::identity)
}

/// Transport that replays scripted outcomes and records every load.
pub struct StubTransport {
    outcomes: Mutex<VecDeque<LoadOutcome>>,
    loads: AtomicUsize,
    requests: Mutex<Vec<Request>>,
}

impl StubTransport {
    pub fn new(outcomes: impl IntoIterator<Item = LoadOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            loads: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `load` was invoked.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Requests seen so far, in invocation order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for StubTransport {
    async fn load(&self, request: Request, _task: &ContainerNetworkTask) -> LoadOutcome {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(LoadOutcome::empty)
    }
}
