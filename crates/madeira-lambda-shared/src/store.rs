//! JSON object storage keyed by bucket and key.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Metadata returned by the store after a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PutAck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// Raw byte storage backing [`ObjectStoreAdapter`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object; `Ok(None)` when the key does not exist.
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `body` under `key`, replacing any existing object.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<PutAck, StoreError>;
}

/// Reads and writes JSON documents through an [`ObjectStore`].
#[derive(Clone)]
pub struct ObjectStoreAdapter {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreAdapter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Fetch and decode an object, yielding an empty JSON object when absent.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Value, StoreError> {
        match self.store.get(bucket, key).await? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| StoreError::Encoding {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    source,
                })
            }
            None => Ok(Value::Object(Map::new())),
        }
    }

    /// Serialize `value` as JSON and store it under `key`.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        value: &Value,
    ) -> Result<PutAck, StoreError> {
        let body = serde_json::to_vec(value).map_err(|source| StoreError::Encoding {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })?;
        self.store.put(bucket, key, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryObjectStore;
    use serde_json::json;

    fn adapter() -> (Arc<MemoryObjectStore>, ObjectStoreAdapter) {
        let store = Arc::new(MemoryObjectStore::new());
        let adapter = ObjectStoreAdapter::new(store.clone());
        (store, adapter)
    }

    #[tokio::test]
    async fn test_missing_object_is_empty() {
        let (store, adapter) = adapter();
        let value = adapter.get_object("bucket", "missing.json").await.unwrap();

        assert_eq!(value, json!({}));
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (store, adapter) = adapter();
        let ack = adapter
            .put_object("bucket", "a.json", &json!({"k": [1, 2]}))
            .await
            .unwrap();

        assert_eq!(ack.version_id.as_deref(), Some("1"));
        assert_eq!(store.object("bucket", "a.json").unwrap(), br#"{"k":[1,2]}"#);
        assert_eq!(
            adapter.get_object("bucket", "a.json").await.unwrap(),
            json!({"k": [1, 2]})
        );
    }

    #[tokio::test]
    async fn test_buckets_are_separate() {
        let (store, adapter) = adapter();
        store.insert("one", "k", "{\"v\":1}");

        assert_eq!(adapter.get_object("one", "k").await.unwrap(), json!({"v": 1}));
        assert_eq!(adapter.get_object("two", "k").await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_undecodable_object_is_an_error() {
        let (store, adapter) = adapter();
        store.insert("bucket", "bad.json", "not json");

        let err = adapter.get_object("bucket", "bad.json").await.unwrap_err();
        assert!(matches!(err, StoreError::Encoding { ref key, .. } if key == "bad.json"));
    }
}
