//! API endpoints and their registration.

use async_trait::async_trait;
use http::Method;
use madeira_lambda_shared::{
    enforce_content_length, ApiPersistence, ApiResponse, Handler, RequestContext, Result, Router,
};
use madeira_lib::Logger;
use serde_json::json;

/// Namespace of the caller's profile object.
pub const PROFILE_NAMESPACE: &str = "profile";

/// Namespace of the caller's preferences object.
pub const PREFERENCES_NAMESPACE: &str = "preferences";

/// Key of the shared announcements object.
pub const ANNOUNCEMENTS_KEY: &str = "announcements.json";

/// Register every API endpoint.
///
/// Endpoints that accept a body are wrapped in the content-length guard.
pub fn build_router(persistence: ApiPersistence) -> Router {
    Router::new()
        .route(
            "profile",
            Method::GET,
            ReadUserObject::new(persistence.clone(), PROFILE_NAMESPACE),
        )
        .route(
            "profile",
            Method::PUT,
            enforce_content_length(WriteUserObject::new(persistence.clone(), PROFILE_NAMESPACE)),
        )
        .route(
            "preferences",
            Method::GET,
            ReadUserObject::new(persistence.clone(), PREFERENCES_NAMESPACE),
        )
        .route(
            "preferences",
            Method::PUT,
            enforce_content_length(WriteUserObject::new(
                persistence.clone(),
                PREFERENCES_NAMESPACE,
            )),
        )
        .route(
            "announcements",
            Method::GET,
            ReadApiObject {
                persistence,
                key: ANNOUNCEMENTS_KEY,
            },
        )
        .route("echo", Method::POST, enforce_content_length(Echo))
}

/// Returns the caller's object in a namespace.
struct ReadUserObject {
    persistence: ApiPersistence,
    namespace: &'static str,
}

impl ReadUserObject {
    fn new(persistence: ApiPersistence, namespace: &'static str) -> Self {
        Self {
            persistence,
            namespace,
        }
    }
}

#[async_trait]
impl Handler for ReadUserObject {
    async fn handle(&self, context: RequestContext, _logger: Logger) -> Result<ApiResponse> {
        self.persistence
            .response_for_user_object_get(self.namespace, &context)
            .await
    }
}

/// Replaces the caller's object in a namespace with the request body.
struct WriteUserObject {
    persistence: ApiPersistence,
    namespace: &'static str,
}

impl WriteUserObject {
    fn new(persistence: ApiPersistence, namespace: &'static str) -> Self {
        Self {
            persistence,
            namespace,
        }
    }
}

#[async_trait]
impl Handler for WriteUserObject {
    async fn handle(&self, context: RequestContext, logger: Logger) -> Result<ApiResponse> {
        logger.info(format!("Updating {} object", self.namespace));
        self.persistence
            .response_for_user_object_put(self.namespace, &context)
            .await
    }
}

/// Returns a shared object from the persistence bucket.
struct ReadApiObject {
    persistence: ApiPersistence,
    key: &'static str,
}

#[async_trait]
impl Handler for ReadApiObject {
    async fn handle(&self, context: RequestContext, _logger: Logger) -> Result<ApiResponse> {
        self.persistence
            .response_for_api_object_get(self.key, &context)
            .await
    }
}

/// Echoes the decoded body and query parameters back to the caller.
struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn handle(&self, context: RequestContext, logger: Logger) -> Result<ApiResponse> {
        logger.debug(format!("Echoing request {}", context.request_id));
        ApiResponse::ok_json(&json!({
            "body": context.body,
            "params": context.params,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use madeira_lambda_shared::test_utils::logger;
    use madeira_lambda_shared::MemoryObjectStore;

    #[test]
    fn test_all_endpoints_registered() {
        let store = Arc::new(MemoryObjectStore::new());
        let router = build_router(ApiPersistence::new(store, logger()));

        assert_eq!(
            router.modules(),
            vec!["announcements", "echo", "preferences", "profile"]
        );
        assert!(router.resolve("/api/profile", &Method::PUT).is_ok());
        assert!(router.resolve("/api/preferences", &Method::GET).is_ok());
        assert!(router.resolve("/api/announcements", &Method::PUT).is_err());
        assert!(router.resolve("/api/echo", &Method::GET).is_err());
    }
}
