//! Replayable request descriptor
//!
//! `ApiRequest` captures everything needed to send a request so the refresh
//! coordinator can replay it after a token refresh. The body is kept as
//! structured JSON (`serde_json::Value`) rather than serialized bytes: each
//! send re-serializes it, so a replay never ships an already-stringified
//! body a second time. Only the Authorization header differs between the
//! original attempt and the replay.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// A single API request: method, path, optional JSON body, extra headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body, serialized fresh on every send.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an extra header. Invalid names/values are rejected at send
    /// time by reqwest, so they are asserted here where the caller can see
    /// them.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}
