//! API Gateway HTTP API (payload format 2.0) invocation events.
//!
//! Only the fields the dispatcher reads are modelled; everything else in the
//! event is ignored during deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound Lambda event as delivered by API Gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub is_base64_encoded: bool,

    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,

    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,

    pub request_context: InvocationRequestContext,
}

/// The `requestContext` block of an invocation event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequestContext {
    pub http: HttpDetails,

    #[serde(default)]
    pub request_id: Option<String>,

    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

/// Method and path of the HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpDetails {
    pub method: String,
    pub path: String,
}

/// Output of a Lambda authorizer attached to the route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorizer {
    #[serde(default)]
    pub lambda: HashMap<String, Value>,
}

impl InvocationEvent {
    /// The `user_hash` value published by the authorizer, if any.
    pub fn user_hash(&self) -> Option<&str> {
        self.request_context
            .authorizer
            .as_ref()
            .and_then(|authorizer| authorizer.lambda.get("user_hash"))
            .and_then(Value::as_str)
            .filter(|hash| !hash.is_empty())
    }

    /// The API Gateway request identifier, if present.
    pub fn request_id(&self) -> Option<&str> {
        self.request_context.request_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_deserializes_http_api_payload() {
        let event: InvocationEvent = serde_json::from_value(json!({
            "version": "2.0",
            "rawPath": "/api/profile",
            "headers": {"content-type": "application/json"},
            "queryStringParameters": {"verbose": "1"},
            "body": "{\"name\":\"n\"}",
            "isBase64Encoded": false,
            "requestContext": {
                "requestId": "abc-123",
                "http": {"method": "PUT", "path": "/api/profile", "sourceIp": "127.0.0.1"},
                "authorizer": {"lambda": {"user_hash": "u1"}}
            }
        }))
        .unwrap();

        assert_eq!(event.request_context.http.method, "PUT");
        assert_eq!(event.request_context.http.path, "/api/profile");
        assert_eq!(event.body.as_deref(), Some("{\"name\":\"n\"}"));
        assert_eq!(event.user_hash(), Some("u1"));
        assert_eq!(event.request_id(), Some("abc-123"));
        assert_eq!(
            event.query_string_parameters.unwrap().get("verbose"),
            Some(&"1".to_string())
        );
    }

    #[test]
    fn test_event_tolerates_missing_optional_blocks() {
        let event: InvocationEvent = serde_json::from_value(json!({
            "requestContext": {"http": {"method": "GET", "path": "/api/announcements"}},
            "headers": null,
            "queryStringParameters": null
        }))
        .unwrap();

        assert!(event.body.is_none());
        assert!(!event.is_base64_encoded);
        assert!(event.headers.is_none());
        assert!(event.user_hash().is_none());
    }

    #[test]
    fn test_empty_user_hash_is_ignored() {
        let event: InvocationEvent = serde_json::from_value(json!({
            "requestContext": {
                "http": {"method": "GET", "path": "/api/profile"},
                "authorizer": {"lambda": {"user_hash": ""}}
            }
        }))
        .unwrap();

        assert!(event.user_hash().is_none());
    }
}
