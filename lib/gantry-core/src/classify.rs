//! Response classification.
//!
//! [`classify`] is the single place where raw transport outcomes become typed
//! results. It never retries and never performs I/O; it inspects the outcome
//! in a fixed priority order and either runs the resource's parse function or
//! constructs the matching [`NetworkError`] variant.
//!
//! Priority order:
//!
//! 1. Transport cancellation wins over everything.
//! 2. Any other transport failure becomes `Request`.
//! 3. No response metadata at all is `Unknown`.
//! 4. Status 401 is `Unauthorized`; `[400, 451]` is `Client`; `[500, 511]`
//!    is `Server`.
//! 5. Every remaining status (2xx, but also 1xx, 3xx, 452-499 and >= 512) is
//!    success-shaped: the payload goes to the parse function, and a parse
//!    failure becomes `Serialization` carrying the original bytes.
//!
//! The gaps at 452-499 and above 511 are deliberate and pinned by tests:
//! those codes are not client or server errors under this classification.

use bytes::Bytes;

use crate::{LoadOutcome, NetworkError, Resource, ResponseMetadata};

const CLIENT_ERROR_BAND: std::ops::RangeInclusive<u16> = 400..=451;
const SERVER_ERROR_BAND: std::ops::RangeInclusive<u16> = 500..=511;

/// Classify a transport outcome into a parsed model or a [`NetworkError`].
///
/// On success the response metadata is always returned alongside the model.
///
/// # Errors
///
/// Returns the classified [`NetworkError`] for any non-success outcome.
pub fn classify<M, E>(
    resource: &Resource<M, E>,
    outcome: LoadOutcome,
) -> Result<(M, ResponseMetadata), NetworkError> {
    let LoadOutcome {
        payload,
        response,
        error,
    } = outcome;

    if let Some(error) = error {
        if error.is_cancelled() {
            return Err(NetworkError::Cancelled);
        }
        return Err(NetworkError::Request(error));
    }

    let Some(response) = response else {
        return Err(NetworkError::Unknown);
    };

    if let Some(error) = status_error(&response, payload.clone()) {
        return Err(error);
    }

    let data = payload.unwrap_or_default();
    match resource.parse(&data) {
        Ok(model) => Ok((model, response)),
        Err(cause) => Err(NetworkError::Serialization {
            cause,
            data: Some(data),
        }),
    }
}

/// Map a status code to its error band, if it falls into one.
fn status_error(response: &ResponseMetadata, payload: Option<Bytes>) -> Option<NetworkError> {
    let status = response.status();

    if response.is_success() {
        return None;
    }
    if status == 401 {
        return Some(NetworkError::Unauthorized {
            response: response.clone(),
            data: payload,
        });
    }
    if CLIENT_ERROR_BAND.contains(&status) {
        return Some(NetworkError::Client {
            response: Some(response.clone()),
            data: payload,
        });
    }
    if SERVER_ERROR_BAND.contains(&status) {
        return Some(NetworkError::Server {
            response: Some(response.clone()),
            data: payload,
        });
    }
    None
}
