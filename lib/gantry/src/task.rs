//! Cancellable task handles.
//!
//! A [`ContainerNetworkTask`] is handed to the caller when a fetch starts and
//! stays valid for the whole pipeline: as retries replace the in-flight
//! transport task, the container's target is swapped so that external
//! `cancel`/`suspend`/`resume` calls always reach the currently active
//! attempt.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};

/// Control surface of one cancellable transport task.
///
/// Implemented by transport collaborators for their in-flight exchanges, and
/// by [`ContainerNetworkTask`] itself, which forwards to its current target.
pub trait NetworkTask: Send + Sync {
    /// Start or continue the task.
    fn resume(&self);

    /// Pause the task, if the transport supports pausing.
    fn suspend(&self);

    /// Cancel the task. Must be safe to call more than once.
    fn cancel(&self);
}

/// A mutable, swappable handle over the currently active transport task.
///
/// At most one transport task is active per container at any time. `cancel`
/// is sticky: once cancelled, the container stays cancelled, and any task
/// assigned afterwards is cancelled immediately instead of being stored, so a
/// scheduled retry can never start a fresh exchange on a cancelled call.
#[derive(Default)]
pub struct ContainerNetworkTask {
    cancelled: AtomicBool,
    active: Mutex<Option<Arc<dyn NetworkTask>>>,
}

impl ContainerNetworkTask {
    /// Creates a handle with no target assigned yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once [`NetworkTask::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Make `task` the active target, replacing any previous one.
    ///
    /// If the container was already cancelled the task is cancelled on the
    /// spot and not stored.
    pub fn assign(&self, task: Arc<dyn NetworkTask>) {
        let mut active = self.lock_active();
        if self.cancelled.load(Ordering::Acquire) {
            drop(active);
            task.cancel();
            return;
        }
        *active = Some(task);
    }

    /// Drop the reference to the active target.
    ///
    /// Called when the pipeline reaches a terminal state so the handle does
    /// not keep transport resources alive.
    pub fn clear(&self) {
        *self.lock_active() = None;
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn NetworkTask>>> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl NetworkTask for ContainerNetworkTask {
    fn resume(&self) {
        if let Some(task) = self.lock_active().as_ref() {
            task.resume();
        }
    }

    fn suspend(&self) {
        if let Some(task) = self.lock_active().as_ref() {
            task.suspend();
        }
    }

    fn cancel(&self) {
        // Set the sticky flag under the lock so a concurrent `assign` either
        // sees it or has its freshly stored task taken right here.
        let taken = {
            let mut active = self.lock_active();
            self.cancelled.store(true, Ordering::Release);
            active.take()
        };
        if let Some(task) = taken {
            task.cancel();
        }
    }
}

impl std::fmt::Debug for ContainerNetworkTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerNetworkTask")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
