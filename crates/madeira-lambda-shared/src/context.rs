//! Per-request context handed to handlers.

use std::collections::HashMap;

use http::Method;
use serde_json::Value;

/// Request data assembled by the dispatcher for a single invocation.
///
/// Deployment-level fields (`persistence_bucket`, `user_hash`) are attached
/// by the function before dispatch; the dispatcher fills in the request
/// fields.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub params: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    /// Body text as received (after base64 decoding when flagged).
    pub raw_body: Option<String>,
    /// Decoded JSON body; `Value::Null` when absent or malformed.
    pub body: Value,
    pub persistence_bucket: Option<String>,
    pub user_hash: Option<String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            request_id: String::new(),
            method: Method::GET,
            path: String::new(),
            params: HashMap::new(),
            headers: HashMap::new(),
            raw_body: None,
            body: Value::Null,
            persistence_bucket: None,
            user_hash: None,
        }
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_persistence_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.persistence_bucket = Some(bucket.into());
        self
    }

    pub fn with_user_hash(mut self, user_hash: Option<impl Into<String>>) -> Self {
        self.user_hash = user_hash.map(Into::into);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Declared `Content-Length`, or zero when absent or unparseable.
    pub fn content_length(&self) -> usize {
        self.header("content-length")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }
}
