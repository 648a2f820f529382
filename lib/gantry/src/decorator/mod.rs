//! Decorating network services.
//!
//! Both decorators implement [`crate::NetworkService`] and wrap an inner one,
//! so they compose freely with the concrete service and with each other:
//!
//! - [`ModifyRequestNetworkService`] - pure request rewriting, no state
//! - [`RetryNetworkService`] - stateful retry orchestration across attempts
//!
//! Order matters for retries: with
//! `RetryNetworkService::new(ModifyRequestNetworkService::new(inner, ..), ..)`
//! the request transforms run again on every attempt, so tokens or
//! timestamps injected by a transform are regenerated fresh.

mod modify_request;
mod retry;

pub use modify_request::{ModifyRequestNetworkService, RequestModification};
pub use retry::{RetryNetworkService, RetryPolicy};
