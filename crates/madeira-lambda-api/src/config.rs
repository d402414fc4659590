use std::env;

/// Environment variable naming the bucket that holds API objects.
pub const PERSISTENCE_BUCKET_ENV: &str = "API_PERSISTENCE_BUCKET";

/// Deployment settings attached to every request context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub persistence_bucket: Option<String>,
}

impl ApiConfig {
    /// Read settings from the function environment.
    pub fn from_env() -> Self {
        Self {
            persistence_bucket: env::var(PERSISTENCE_BUCKET_ENV)
                .ok()
                .map(|bucket| bucket.trim().to_string())
                .filter(|bucket| !bucket.is_empty()),
        }
    }

    pub fn with_persistence_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.persistence_bucket = Some(bucket.into());
        self
    }
}
