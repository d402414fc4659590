//! AWS Lambda function serving the Madeira user API.
//!
//! Requests arrive from API Gateway as HTTP API events and are dispatched by
//! path to the endpoints in [`build_router`]. Caller-scoped objects are keyed
//! by the `user_hash` published by the route's Lambda authorizer.

#![deny(warnings)]

mod config;
mod endpoints;

use std::env;
use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use madeira_lambda_shared::{
    from_error, ApiPersistence, ApiResponse, InvocationEvent, ObjectStore, RequestContext, Router,
    S3ObjectStore,
};
use madeira_lib::{get_logger, LogFormat, Logger, LoggingConfig};

pub use config::{ApiConfig, PERSISTENCE_BUCKET_ENV};
pub use endpoints::{build_router, ANNOUNCEMENTS_KEY, PREFERENCES_NAMESPACE, PROFILE_NAMESPACE};

/// Logger name used by the API function.
pub const LOGGER_NAME: &str = "madeira-api";

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    let logger = get_logger(&logging_config());
    let config = ApiConfig::from_env();
    if config.persistence_bucket.is_none() {
        logger.warn(format!(
            "{} is not set; persistence endpoints will fail",
            PERSISTENCE_BUCKET_ENV
        ));
    }

    let store = Arc::new(S3ObjectStore::from_env().await);
    let api = Api::new(config, store, logger);

    lambda_runtime::run(service_fn(|event| api.handler(event))).await
}

/// JSON logs unless `LOG_FORMAT` asks otherwise.
fn logging_config() -> LoggingConfig {
    let config = LoggingConfig::from_env();
    let config = if env::var_os("LOGGER_NAME").is_none() {
        config.with_name(LOGGER_NAME)
    } else {
        config
    };
    if env::var_os("LOG_FORMAT").is_none() {
        config.with_format(LogFormat::Json)
    } else {
        config
    }
}

/// The API function: router, deployment settings and logger.
pub struct Api {
    router: Router,
    config: ApiConfig,
    logger: Logger,
}

impl Api {
    pub fn new(config: ApiConfig, store: Arc<dyn ObjectStore>, logger: Logger) -> Self {
        let persistence = ApiPersistence::new(store, logger.clone());
        Self {
            router: build_router(persistence),
            config,
            logger,
        }
    }

    /// Lambda handler invoked per request.
    pub async fn handler(&self, event: LambdaEvent<Value>) -> Result<ApiResponse, Error> {
        let request_id = event.context.request_id.clone();
        Ok(self.handle_payload(event.payload, &request_id).await)
    }

    /// Dispatch a raw event payload; every failure becomes a problem response.
    pub async fn handle_payload(&self, payload: Value, request_id: &str) -> ApiResponse {
        let event: InvocationEvent = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(e) => {
                error!(request_id = %request_id, error = %e, "failed to parse event");
                return ApiResponse::bad_request(format!("Invalid request: {}", e), request_id);
            }
        };

        info!(
            request_id = %request_id,
            method = %event.request_context.http.method,
            path = %event.request_context.http.path,
            authenticated = event.user_hash().is_some(),
            "handling API request"
        );

        let mut context = RequestContext::new()
            .with_request_id(request_id)
            .with_user_hash(event.user_hash());
        context.persistence_bucket = self.config.persistence_bucket.clone();

        match self
            .router
            .process_request(event, context, &self.logger)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!(request_id = %request_id, error = %err, "request failed");
                ApiResponse::problem(&from_error(&err, request_id))
            }
        }
    }
}
