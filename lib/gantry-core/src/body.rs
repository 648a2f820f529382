//! Body serialization utilities.

use bytes::Bytes;

use crate::{BuildResult, JsonDecodeError, TransportError};

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use gantry_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Train { name: String }
///
/// let train = Train { name: "ICE".to_string() };
/// let bytes = to_json(&train).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"ICE"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> BuildResult<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| TransportError::invalid_request(e.to_string()))
}

/// Serialize a value to form URL-encoded bytes.
///
/// Uses `serde_html_form` which supports `Vec<T>` for repeated form fields
/// (e.g., `tags=a&tags=b&tags=c`).
///
/// # Errors
///
/// Returns an error if form serialization fails.
pub fn to_form<T: serde::Serialize>(value: &T) -> BuildResult<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(|e| TransportError::invalid_request(e.to_string()))
}

/// Serialize a value to a query string.
///
/// # Errors
///
/// Returns an error if query serialization fails.
pub fn to_query_string<T: serde::Serialize>(value: &T) -> BuildResult<String> {
    serde_html_form::to_string(value).map_err(|e| TransportError::invalid_request(e.to_string()))
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so failures name the exact field that could
/// not be deserialized (e.g., "user.address.city").
///
/// # Errors
///
/// Returns a [`JsonDecodeError`] if deserialization fails.
///
/// # Example
///
/// ```
/// use gantry_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Train { name: String }
///
/// let bytes = br#"{"name":"ICE"}"#;
/// let train: Train = from_json(bytes).expect("deserialize");
/// assert_eq!(train, Train { name: "ICE".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, JsonDecodeError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| JsonDecodeError {
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}
