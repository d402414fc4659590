//! RFC 9457 Problem Details for API error responses.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Problem type URI for invalid request input.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for paths with no registered module.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Problem type URI for methods a module does not support.
pub const PROBLEM_METHOD_NOT_ALLOWED: &str = "/problems/method-not-allowed";

/// Problem type URI for requests that need a caller identity.
pub const PROBLEM_UNAUTHORIZED: &str = "/problems/unauthorized";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use madeira_lambda_shared::{ProblemDetails, PROBLEM_ROUTE_NOT_FOUND};
///
/// let problem = ProblemDetails::new(PROBLEM_ROUTE_NOT_FOUND, "Route Not Found", StatusCode::NOT_FOUND)
///     .with_detail("no handler registered for /api/unknown")
///     .with_request_id("req-12345");
/// assert_eq!(problem.status, 404);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier of the failing invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the request identifier, skipping empty identifiers.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        if !request_id.is_empty() {
            self.instance = Some(request_id);
        }
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for a path with no registered module.
    pub fn route_not_found(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 405 Method Not Allowed.
    pub fn method_not_allowed(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_METHOD_NOT_ALLOWED,
            "Method Not Allowed",
            StatusCode::METHOD_NOT_ALLOWED,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 401 Unauthorized for writes without a caller identity.
    pub fn unauthorized(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_UNAUTHORIZED, "Unauthorized", StatusCode::UNAUTHORIZED)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ProblemDetails {}

/// Map a request handling error to the matching problem response.
pub fn from_error(err: &Error, request_id: &str) -> ProblemDetails {
    match err {
        Error::RouteNotFound { .. } => ProblemDetails::route_not_found(err.to_string(), request_id),
        Error::MethodNotAllowed { .. } => {
            ProblemDetails::method_not_allowed(err.to_string(), request_id)
        }
        Error::MissingIdentity { .. } => ProblemDetails::unauthorized(err.to_string(), request_id),
        Error::MissingBucket | Error::Store(_) | Error::Serialization(_) => {
            ProblemDetails::internal_error(err.to_string(), request_id)
        }
    }
}
