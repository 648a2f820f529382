//! Transport response metadata.
//!
//! [`ResponseMetadata`] is the slice of the transport response handed back to
//! callers: status code and headers. The body is not carried here - it goes
//! through the resource's parse function instead.
//!
//! [`LoadOutcome`] is the raw triple a transport collaborator reports for one
//! exchange; the response classifier turns it into a typed result.

use std::collections::HashMap;

use bytes::Bytes;

use crate::TransportError;

/// Status code and headers of a transport response.
///
/// Returned alongside the parsed model on every successful fetch, and
/// embedded in the classified errors that carry a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    status: u16,
    headers: HashMap<String, String>,
}

impl ResponseMetadata {
    /// Creates new response metadata.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>) -> Self {
        Self { status, headers }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Raw outcome of one transport exchange.
///
/// Any combination of fields may be present; the classifier gives transport
/// errors priority over response data.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Response payload, if any bytes arrived.
    pub payload: Option<Bytes>,
    /// Response metadata, if the exchange produced a response.
    pub response: Option<ResponseMetadata>,
    /// Transport failure, if the exchange could not complete.
    pub error: Option<TransportError>,
}

impl LoadOutcome {
    /// Outcome for a completed exchange.
    #[must_use]
    pub const fn success(response: ResponseMetadata, payload: Bytes) -> Self {
        Self {
            payload: Some(payload),
            response: Some(response),
            error: None,
        }
    }

    /// Outcome for a failed exchange.
    #[must_use]
    pub const fn failure(error: TransportError) -> Self {
        Self {
            payload: None,
            response: None,
            error: Some(error),
        }
    }

    /// Outcome with neither response nor error.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            payload: None,
            response: None,
            error: None,
        }
    }
}
