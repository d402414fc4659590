//! Path-based request dispatch.
//!
//! A request for `/api/user/settings` resolves to the module `user.settings`;
//! the handler is then picked by HTTP method. Handlers are registered
//! explicitly when the [`Router`] is built:
//!
//! ```
//! use http::Method;
//! use madeira_lambda_shared::{ApiResponse, RequestContext, Router};
//! use madeira_lib::Logger;
//! use serde_json::json;
//!
//! let router = Router::new().route(
//!     "status",
//!     Method::GET,
//!     |_context: RequestContext, _logger: Logger| async { ApiResponse::ok_json(&json!({"ok": true})) },
//! );
//! assert!(router.resolve("/api/status", &Method::GET).is_ok());
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use http::Method;
use madeira_lib::Logger;
use serde_json::Value;

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::event::InvocationEvent;
use crate::response::ApiResponse;

/// Path prefix stripped before deriving the module name.
pub const ROUTE_PREFIX: &str = "/api/";

/// An endpoint implementation invoked by the [`Router`].
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, context: RequestContext, logger: Logger) -> Result<ApiResponse>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(RequestContext, Logger) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse>> + Send + 'static,
{
    async fn handle(&self, context: RequestContext, logger: Logger) -> Result<ApiResponse> {
        (self)(context, logger).await
    }
}

/// Derive the module name for a request path.
///
/// Strips [`ROUTE_PREFIX`], trims surrounding slashes and joins the remaining
/// segments with dots.
pub fn module_for_path(path: &str) -> String {
    path.strip_prefix(ROUTE_PREFIX)
        .unwrap_or(path)
        .trim_matches('/')
        .replace('/', ".")
}

/// Registry of handlers keyed by module name and HTTP method.
#[derive(Clone, Default)]
pub struct Router {
    modules: HashMap<String, HashMap<Method, Arc<dyn Handler>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` requests to `module`.
    ///
    /// Registering the same module and method twice replaces the earlier handler.
    pub fn route<H>(mut self, module: impl Into<String>, method: Method, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(method, Arc::new(handler));
        self
    }

    /// Registered module names, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Find the handler for `path` and `method`.
    pub fn resolve(&self, path: &str, method: &Method) -> Result<Arc<dyn Handler>> {
        let module = module_for_path(path);
        let handlers = self
            .modules
            .get(&module)
            .ok_or_else(|| Error::RouteNotFound {
                path: path.to_string(),
                module: module.clone(),
            })?;

        handlers
            .get(method)
            .cloned()
            .ok_or_else(|| Error::MethodNotAllowed {
                method: method.as_str().to_string(),
                module,
            })
    }

    /// Dispatch an invocation event to its handler.
    ///
    /// `context` carries the deployment fields attached by the caller; the
    /// request fields are filled in here. A body that is not valid JSON is
    /// logged and replaced with `null` before the handler runs.
    pub async fn process_request(
        &self,
        event: InvocationEvent,
        mut context: RequestContext,
        logger: &Logger,
    ) -> Result<ApiResponse> {
        let http = &event.request_context.http;
        logger.info(format!("Processing {} request for {}", http.method, http.path));

        let module = module_for_path(&http.path);
        let method = Method::from_bytes(http.method.to_ascii_uppercase().as_bytes()).map_err(
            |_| Error::MethodNotAllowed {
                method: http.method.clone(),
                module: module.clone(),
            },
        )?;
        let handler = self.resolve(&http.path, &method)?;
        logger.debug(format!(
            "Dispatching to {} handler of module {}",
            method.as_str().to_ascii_lowercase(),
            module
        ));

        let raw_body = decode_body(&event, logger);
        let body = parse_body(raw_body.as_deref(), logger);

        if context.request_id.is_empty() {
            if let Some(request_id) = event.request_id() {
                context.request_id = request_id.to_string();
            }
        }
        if context.user_hash.is_none() {
            context.user_hash = event.user_hash().map(str::to_string);
        }
        context.method = method;
        context.path = http.path.clone();
        context.params = event.query_string_parameters.clone().unwrap_or_default();
        context.headers = event.headers.clone().unwrap_or_default();
        context.raw_body = raw_body;
        context.body = body;

        handler.handle(context, logger.clone()).await
    }
}

fn decode_body(event: &InvocationEvent, logger: &Logger) -> Option<String> {
    let body = event.body.as_ref()?;
    if !event.is_base64_encoded {
        return Some(body.clone());
    }

    let bytes = match base64::engine::general_purpose::STANDARD.decode(body) {
        Ok(bytes) => bytes,
        Err(err) => {
            logger.error(format!("Failed to decode base64 request body: {}", err));
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(err) => {
            logger.error(format!("Request body is not valid UTF-8: {}", err));
            None
        }
    }
}

fn parse_body(raw_body: Option<&str>, logger: &Logger) -> Value {
    let Some(raw) = raw_body.filter(|raw| !raw.trim().is_empty()) else {
        return Value::Null;
    };

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            logger.error(format!("Failed to decode request body as JSON: {}", err));
            logger.debug(format!("Raw request body: {}", raw));
            Value::Null
        }
    }
}
