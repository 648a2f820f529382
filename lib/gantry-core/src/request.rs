//! HTTP request descriptors.
//!
//! [`Request`] is an immutable, transport-level description of one call:
//! method, URL, headers, optional body. Use [`Request::builder`] to construct
//! one, and the `with_*` methods to derive rewritten descriptors without
//! mutating the original - the request-modifying decorator applies exactly
//! these kinds of pure transforms.
//!
//! # Example
//!
//! ```
//! use gantry_core::{Request, Method};
//!
//! let request = Request::builder(Method::Get, "https://api.example.com/train".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .query("page", "1")
//!     .build();
//!
//! let authed = request.with_header("Authorization", "Bearer token");
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::Method;

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }

    // ========================================================================
    // Pure rewriting
    // ========================================================================

    /// Returns a new request with the header set, overriding any existing
    /// value for the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns a new request with the query pairs appended, keeping every
    /// existing pair.
    #[must_use]
    pub fn with_appended_query(
        mut self,
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        {
            let mut query = self.url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(&name, &value);
            }
        }
        self
    }

    /// Returns a new request with the query pairs merged in, overriding every
    /// existing pair whose key matches.
    #[must_use]
    pub fn with_replaced_query(
        mut self,
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let replacements: Vec<(String, String)> = pairs.into_iter().collect();
        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(name, _)| !replacements.iter().any(|(r, _)| r == name))
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        self.url.set_query(None);
        {
            let mut query = self.url.query_pairs_mut();
            for (name, value) in kept.iter().chain(replacements.iter()) {
                query.append_pair(name, value);
            }
        }
        self
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Appends query parameters from a serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if query serialization fails.
    pub fn query_serialized<T: serde::Serialize>(mut self, value: &T) -> crate::BuildResult<Self> {
        let query = crate::to_query_string(value)?;
        {
            let mut pairs = self.url.query_pairs_mut();
            for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
                pairs.append_pair(&name, &value);
            }
        }
        Ok(self)
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::BuildResult<Self> {
        let body = crate::to_json(value)?;
        Ok(self.header("Content-Type", "application/json").body(body))
    }

    /// Set a form-urlencoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn form<T: serde::Serialize>(self, value: &T) -> crate::BuildResult<Self> {
        let body = crate::to_form(value)?;
        Ok(self
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body))
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}
