//! Handler wrappers applied before an endpoint runs.

use async_trait::async_trait;
use madeira_lib::Logger;

use crate::context::RequestContext;
use crate::error::Result;
use crate::response::ApiResponse;
use crate::router::Handler;

/// Requests with a body of this many bytes or more are rejected.
pub const CONTENT_LENGTH_LIMIT: usize = 2048;

/// Rejects oversized request bodies without invoking the wrapped handler.
#[derive(Debug, Clone)]
pub struct ContentLengthGuard<H> {
    inner: H,
    limit: usize,
}

/// Guard `handler` with the default [`CONTENT_LENGTH_LIMIT`].
pub fn enforce_content_length<H: Handler>(handler: H) -> ContentLengthGuard<H> {
    ContentLengthGuard::new(handler, CONTENT_LENGTH_LIMIT)
}

impl<H> ContentLengthGuard<H> {
    pub fn new(inner: H, limit: usize) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Size checked against the limit: the larger of the declared
    /// `Content-Length` and the received body length.
    fn measured_length(context: &RequestContext) -> Option<usize> {
        let body = context.raw_body.as_deref().filter(|body| !body.is_empty())?;
        Some(context.content_length().max(body.len()))
    }
}

#[async_trait]
impl<H: Handler> Handler for ContentLengthGuard<H> {
    async fn handle(&self, context: RequestContext, logger: Logger) -> Result<ApiResponse> {
        if let Some(length) = Self::measured_length(&context) {
            if length >= self.limit {
                let message = format!(
                    "Cannot process request; content length: {} is at or above limit: {}",
                    length, self.limit
                );
                logger.error(&message);
                return Ok(ApiResponse::bad_request(message, context.request_id));
            }
        }

        self.inner.handle(context, logger).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::test_utils::logger;

    #[derive(Clone, Default)]
    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        async fn handle(&self, _context: RequestContext, _logger: Logger) -> Result<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ApiResponse::ok_json(&serde_json::json!({"ok": true}))
        }
    }

    fn with_body(body: &str) -> RequestContext {
        let mut context = RequestContext::new().with_request_id("req-1");
        context.raw_body = Some(body.to_string());
        context
    }

    #[tokio::test]
    async fn test_body_at_limit_is_rejected() {
        let handler = CountingHandler::default();
        let guard = enforce_content_length(handler.clone());

        let response = guard
            .handle(with_body(&"x".repeat(CONTENT_LENGTH_LIMIT)), logger())
            .await
            .unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
        let body = response.json_body().unwrap();
        assert_eq!(
            body["detail"],
            "Cannot process request; content length: 2048 is at or above limit: 2048"
        );
        assert_eq!(body["instance"], "req-1");
    }

    #[tokio::test]
    async fn test_body_below_limit_is_accepted() {
        let handler = CountingHandler::default();
        let guard = enforce_content_length(handler.clone());

        let response = guard
            .handle(with_body(&"x".repeat(CONTENT_LENGTH_LIMIT - 1)), logger())
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_declared_length_is_checked() {
        let handler = CountingHandler::default();
        let guard = enforce_content_length(handler.clone());

        let mut context = with_body("{}");
        context
            .headers
            .insert("Content-Length".to_string(), "4096".to_string());

        let response = guard.handle(context, logger()).await.unwrap();
        assert_eq!(response.status_code, 400);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_requests_without_body_pass_through() {
        let handler = CountingHandler::default();
        let guard = ContentLengthGuard::new(handler.clone(), 1);
        assert_eq!(guard.limit(), 1);

        let mut context = RequestContext::new();
        context
            .headers
            .insert("content-length".to_string(), "99999".to_string());

        let response = guard.handle(context, logger()).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }
}
