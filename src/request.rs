//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

/// An incoming HTTP request with its body fully buffered.
///
/// Path parameters are filled in by the router once a route matches.
pub struct Request {
    pub(crate) method: http::Method,
    pub(crate) path: String,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(method: http::Method, path: String, body: Bytes) -> Self {
        Self { method, path, body, params: HashMap::new() }
    }

    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }

    /// Returns a named path parameter.
    ///
    /// For a route `/prendas/{codigo}`, `req.param("codigo")` on `/prendas/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Deserializes the body as JSON into `T`.
    ///
    /// An empty body is an error like any other malformed payload.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
