use thiserror::Error;

/// Convenient result alias for Lambda request handling.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while dispatching and serving an API request.
#[derive(Debug, Error)]
pub enum Error {
    /// No handlers are registered for the module derived from the path.
    #[error("no handler registered for {path} (module '{module}')")]
    RouteNotFound { path: String, module: String },

    /// The module exists but has no handler for the request method.
    #[error("method {method} is not supported by module '{module}'")]
    MethodNotAllowed { method: String, module: String },

    /// A caller-scoped write was attempted without a caller identity.
    #[error("cannot write {namespace} without an authenticated user")]
    MissingIdentity { namespace: String },

    /// The request context carries no persistence bucket.
    #[error("no persistence bucket configured for this request")]
    MissingBucket,

    /// The object store failed or returned an undecodable object.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A response payload could not be serialized.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by [`ObjectStore`](crate::ObjectStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected or failed the request.
    #[error("object store request for {bucket}/{key} failed: {message}")]
    Backend {
        bucket: String,
        key: String,
        message: String,
    },

    /// A stored object could not be decoded as JSON.
    #[error("object {bucket}/{key} is not valid JSON")]
    Encoding {
        bucket: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn backend(bucket: &str, key: &str, message: impl ToString) -> Self {
        StoreError::Backend {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}
