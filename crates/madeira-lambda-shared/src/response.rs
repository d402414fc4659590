//! API Gateway proxy responses.

use std::collections::HashMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::problem::ProblemDetails;

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_PROBLEM: &str = "application/problem+json";

/// Response returned to API Gateway for every invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiResponse {
    /// JSON response with an explicit status code.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Result<Self> {
        Ok(Self::with_body(
            status,
            CONTENT_TYPE_JSON,
            serde_json::to_string(payload)?,
        ))
    }

    /// 200 OK with a JSON payload.
    pub fn ok_json<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        Self::json(StatusCode::OK, payload)
    }

    /// Problem response using the problem's own status code.
    pub fn problem(problem: &ProblemDetails) -> Self {
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // ProblemDetails holds only strings and an integer.
        let body = serde_json::to_string(problem).unwrap_or_default();
        Self::with_body(status, CONTENT_TYPE_PROBLEM, body)
    }

    /// 400 Bad Request carrying `detail`.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::problem(&ProblemDetails::bad_request(detail, request_id))
    }

    /// Status code as an [`http::StatusCode`].
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Parse the body back into JSON.
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    fn with_body(status: StatusCode, content_type: &str, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        Self {
            status_code: status.as_u16(),
            headers,
            body,
            is_base64_encoded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_json_response() {
        let response = ApiResponse::ok_json(&json!({"hello": "world"})).unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["content-type"], "application/json");
        assert_eq!(response.json_body(), Some(json!({"hello": "world"})));
        assert!(!response.is_base64_encoded);
    }

    #[test]
    fn test_bad_request_uses_problem_body() {
        let response = ApiResponse::bad_request("too big", "req-9");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers["content-type"], "application/problem+json");
        let body = response.json_body().unwrap();
        assert_eq!(body["detail"], "too big");
        assert_eq!(body["instance"], "req-9");
    }

    #[test]
    fn test_response_serializes_proxy_fields() {
        let response = ApiResponse::ok_json(&json!([])).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["isBase64Encoded"], false);
        assert_eq!(json["body"], "[]");
    }
}
