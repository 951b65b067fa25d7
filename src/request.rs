//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};

/// An incoming HTTP request with its body already collected.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    /// A request with no headers and an empty body. Handy for driving
    /// handlers directly in tests.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            path: parts.uri.path().to_owned(),
            method: parts.method,
            headers: parts.headers,
            body,
            params: HashMap::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The raw method string, e.g. `"GET"`. Extension methods come through
    /// unchanged.
    pub fn method(&self) -> &str { self.method.as_str() }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Header lookup. `HeaderMap` keys are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn http_method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}
