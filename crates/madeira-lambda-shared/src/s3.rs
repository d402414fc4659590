//! Amazon S3 implementation of [`ObjectStore`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{ObjectStore, PutAck};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Object store backed by an S3 client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration (environment, profile
    /// or instance role).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        debug!(%bucket, %key, "fetching object");
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|service| service.is_no_such_key())
                    .unwrap_or(false)
                {
                    return Ok(None);
                }
                return Err(StoreError::backend(bucket, key, DisplayErrorContext(&err)));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::backend(bucket, key, err))?;
        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<PutAck, StoreError> {
        debug!(%bucket, %key, bytes = body.len(), "storing object");
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(JSON_CONTENT_TYPE)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StoreError::backend(bucket, key, DisplayErrorContext(&err)))?;

        Ok(PutAck {
            e_tag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }
}
