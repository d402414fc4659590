//! Test utilities for Lambda handler testing.
//!
//! # Usage
//!
//! ```ignore
//! use madeira_lambda_shared::test_utils::{event, logger, mock_request_id};
//!
//! let event = event("GET", "/api/profile", None);
//! let request_id = mock_request_id("profile-get");
//! ```

use std::collections::HashMap;

use madeira_lib::Logger;
use serde_json::Value;

use crate::event::{Authorizer, HttpDetails, InvocationEvent, InvocationRequestContext};

/// Build a minimal HTTP API event for `method` and `path`.
///
/// The `content-length` header is set from the body when one is given.
pub fn event(method: &str, path: &str, body: Option<&str>) -> InvocationEvent {
    let mut headers = HashMap::new();
    if let Some(body) = body {
        headers.insert("content-length".to_string(), body.len().to_string());
    }

    InvocationEvent {
        body: body.map(str::to_string),
        is_base64_encoded: false,
        headers: Some(headers),
        query_string_parameters: None,
        request_context: InvocationRequestContext {
            http: HttpDetails {
                method: method.to_string(),
                path: path.to_string(),
            },
            request_id: Some(mock_request_id(path.trim_matches('/'))),
            authorizer: None,
        },
    }
}

/// Like [`event`], with an authorizer publishing `user_hash`.
pub fn authorized_event(
    method: &str,
    path: &str,
    body: Option<&str>,
    user_hash: &str,
) -> InvocationEvent {
    let mut event = event(method, path, body);
    event.request_context.authorizer = Some(Authorizer {
        lambda: HashMap::from([(
            "user_hash".to_string(),
            Value::String(user_hash.to_string()),
        )]),
    });
    event
}

/// Logger handle for tests; no subscriber is installed.
pub fn logger() -> Logger {
    Logger::new("test")
}

/// Create a mock request ID for testing.
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}
