//! Error types for gantry.
//!
//! Two layers of failure are distinguished:
//!
//! - [`TransportError`] - the transport collaborator could not complete the
//!   exchange (connection, TLS, timeout, cancellation).
//! - [`NetworkError`] - the closed taxonomy produced by the response
//!   classifier from `(status code, payload, transport error)`. Application
//!   code never sees it directly when using a [`crate::Resource`]: the
//!   resource's error mapper converts it into the caller's own error type.

use bytes::Bytes;
use derive_more::{Display, Error, From};

use crate::ResponseMetadata;

/// Error produced by a resource's parse function.
pub type ParseError = Box<dyn std::error::Error + Send + Sync>;

/// Result of request construction, before any I/O happens.
pub type BuildResult<T> = std::result::Result<T, TransportError>;

// ============================================================================
// Transport errors
// ============================================================================

/// Failure reported by the transport collaborator.
#[derive(Debug, Display, Error)]
pub enum TransportError {
    /// Network/connection errors.
    #[display("connection error: {_0}")]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),

    /// The exchange was cancelled through its task handle.
    #[display("cancelled")]
    Cancelled,
}

impl TransportError {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if this failure is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ============================================================================
// Network error taxonomy
// ============================================================================

/// Classified outcome of a failed resource fetch.
///
/// Constructed only by the response classifier (see [`crate::classify`]);
/// the `Unknown` and `Cancelled` variants additionally appear in edge
/// branches of the execution pipeline.
#[derive(Debug, Error, From)]
pub enum NetworkError {
    /// The transport produced neither a response nor an error.
    #[from(skip)]
    Unknown,

    /// The call was cancelled through its task handle.
    #[from(skip)]
    Cancelled,

    /// HTTP 401.
    #[from(skip)]
    Unauthorized {
        /// Response metadata of the 401 response.
        response: ResponseMetadata,
        /// Response payload, untouched.
        #[error(not(source))]
        data: Option<Bytes>,
    },

    /// HTTP status in `[400, 451]` other than 401.
    #[from(skip)]
    Client {
        /// Response metadata, if the transport produced any.
        response: Option<ResponseMetadata>,
        /// Response payload, untouched.
        #[error(not(source))]
        data: Option<Bytes>,
    },

    /// The payload could not be parsed into the resource's model.
    #[from(skip)]
    Serialization {
        /// The parse failure.
        #[error(not(source))]
        cause: ParseError,
        /// The bytes that failed to parse.
        #[error(not(source))]
        data: Option<Bytes>,
    },

    /// The transport collaborator failed before a response was classified.
    Request(TransportError),

    /// HTTP status in `[500, 511]`.
    #[from(skip)]
    Server {
        /// Response metadata, if the transport produced any.
        response: Option<ResponseMetadata>,
        /// Response payload, untouched.
        #[error(not(source))]
        data: Option<Bytes>,
    },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown network error"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unauthorized { .. } => write!(f, "unauthorized (HTTP 401)"),
            Self::Client { response, .. } => match response {
                Some(meta) => write!(f, "client error (HTTP {})", meta.status()),
                None => write!(f, "client error"),
            },
            Self::Serialization { cause, .. } => write!(f, "serialization error: {cause}"),
            Self::Request(cause) => write!(f, "request error: {cause}"),
            Self::Server { response, .. } => match response {
                Some(meta) => write!(f, "server error (HTTP {})", meta.status()),
                None => write!(f, "server error"),
            },
        }
    }
}

impl NetworkError {
    /// Returns the HTTP status code carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { response, .. } => Some(response.status()),
            Self::Client { response, .. } | Self::Server { response, .. } => {
                response.as_ref().map(ResponseMetadata::status)
            }
            _ => None,
        }
    }

    /// Returns the response payload carried by this error, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Self::Unauthorized { data, .. }
            | Self::Client { data, .. }
            | Self::Serialization { data, .. }
            | Self::Server { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if this error is a cancellation, either observed by the
    /// pipeline or reported by the transport.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Request(TransportError::Cancelled))
    }

    /// Returns `true` if this is a classified server error (5xx band).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Returns `true` if this is a classified client error (401 or 4xx band).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Client { .. } | Self::Unauthorized { .. })
    }
}

// ============================================================================
// JSON decoding
// ============================================================================

/// JSON deserialization error with path context.
#[derive(Debug, Display, Error)]
#[display("JSON deserialization error at '{path}': {message}")]
pub struct JsonDecodeError {
    /// JSON path to the error (e.g., "user.address.city").
    pub path: String,
    /// Error message.
    pub message: String,
}
