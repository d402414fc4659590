//! API-level persistence over an [`ObjectStore`].
//!
//! Objects are JSON documents in the request's persistence bucket. Shared API
//! objects live under caller-chosen keys; caller-scoped objects live under
//! `<namespace>/<user_hash>`.

use std::sync::Arc;

use madeira_lib::Logger;
use serde_json::{json, Map, Value};

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::response::ApiResponse;
use crate::store::{ObjectStore, ObjectStoreAdapter, PutAck};

/// Key of the caller-scoped object for `namespace`.
pub fn user_object_key(namespace: &str, user_hash: &str) -> String {
    format!("{}/{}", namespace, user_hash)
}

/// Reads and writes API objects on behalf of request handlers.
#[derive(Clone)]
pub struct ApiPersistence {
    objects: ObjectStoreAdapter,
    logger: Logger,
}

impl ApiPersistence {
    pub fn new(store: Arc<dyn ObjectStore>, logger: Logger) -> Self {
        Self {
            objects: ObjectStoreAdapter::new(store),
            logger,
        }
    }

    /// Fetch an object from an explicit bucket.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Value> {
        Ok(self.objects.get_object(bucket, key).await?)
    }

    /// Fetch a shared API object from the request's persistence bucket.
    pub async fn get_api_object(&self, key: &str, context: &RequestContext) -> Result<Value> {
        self.get_object(bucket(context)?, key).await
    }

    /// Fetch the caller's object in `namespace`.
    ///
    /// Anonymous callers get an empty object without touching the store.
    pub async fn get_user_object(
        &self,
        namespace: &str,
        context: &RequestContext,
    ) -> Result<Value> {
        let Some(user_hash) = context.user_hash.as_deref() else {
            self.logger.debug(format!(
                "No user identity on request; returning empty {}",
                namespace
            ));
            return Ok(Value::Object(Map::new()));
        };

        self.get_object(bucket(context)?, &user_object_key(namespace, user_hash))
            .await
    }

    /// Store the request body under `key` in the persistence bucket.
    pub async fn write_api_object(&self, key: &str, context: &RequestContext) -> Result<PutAck> {
        let bucket = bucket(context)?;
        self.logger
            .info(format!("Writing object {} to bucket {}", key, bucket));
        Ok(self.objects.put_object(bucket, key, &context.body).await?)
    }

    /// Store the request body as the caller's object in `namespace`.
    pub async fn write_user_object(
        &self,
        namespace: &str,
        context: &RequestContext,
    ) -> Result<PutAck> {
        let user_hash = context
            .user_hash
            .as_deref()
            .ok_or_else(|| Error::MissingIdentity {
                namespace: namespace.to_string(),
            })?;

        self.write_api_object(&user_object_key(namespace, user_hash), context)
            .await
    }

    /// 200 response carrying the caller's object in `namespace`.
    pub async fn response_for_user_object_get(
        &self,
        namespace: &str,
        context: &RequestContext,
    ) -> Result<ApiResponse> {
        let object = self.get_user_object(namespace, context).await?;
        ApiResponse::ok_json(&object)
    }

    /// Write the caller's object and confirm with `{"result": "<Namespace> have been updated!"}`.
    pub async fn response_for_user_object_put(
        &self,
        namespace: &str,
        context: &RequestContext,
    ) -> Result<ApiResponse> {
        self.write_user_object(namespace, context).await?;
        ApiResponse::ok_json(&json!({
            "result": format!("{} have been updated!", title_case(namespace)),
        }))
    }

    /// 200 response carrying the shared API object at `key`.
    pub async fn response_for_api_object_get(
        &self,
        key: &str,
        context: &RequestContext,
    ) -> Result<ApiResponse> {
        let object = self.get_api_object(key, context).await?;
        ApiResponse::ok_json(&object)
    }
}

fn bucket(context: &RequestContext) -> Result<&str> {
    context
        .persistence_bucket
        .as_deref()
        .filter(|bucket| !bucket.is_empty())
        .ok_or(Error::MissingBucket)
}

/// Capitalise the first letter of every word, lowercasing the rest.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                titled.extend(ch.to_uppercase());
            } else {
                titled.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            titled.push(ch);
            at_word_start = true;
        }
    }
    titled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryObjectStore;
    use crate::test_utils::logger;

    const BUCKET: &str = "persistence";

    fn persistence() -> (Arc<MemoryObjectStore>, ApiPersistence) {
        let store = Arc::new(MemoryObjectStore::new());
        (store.clone(), ApiPersistence::new(store, logger()))
    }

    fn context(user_hash: Option<&str>, body: Value) -> RequestContext {
        RequestContext::new()
            .with_persistence_bucket(BUCKET)
            .with_user_hash(user_hash)
            .with_body(body)
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("preferences"), "Preferences");
        assert_eq!(title_case("user settings"), "User Settings");
        assert_eq!(title_case("PROFILE"), "Profile");
        assert_eq!(title_case("dark_mode"), "Dark_Mode");
    }

    #[test]
    fn test_user_object_key() {
        assert_eq!(user_object_key("profile", "u1"), "profile/u1");
    }

    #[tokio::test]
    async fn test_anonymous_read_skips_store() {
        let (store, persistence) = persistence();
        let value = persistence
            .get_user_object("profile", &context(None, Value::Null))
            .await
            .unwrap();

        assert_eq!(value, json!({}));
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn test_user_read_uses_namespaced_key() {
        let (store, persistence) = persistence();
        store.insert(BUCKET, "profile/u1", r#"{"name":"n"}"#);

        let value = persistence
            .get_user_object("profile", &context(Some("u1"), Value::Null))
            .await
            .unwrap();
        assert_eq!(value, json!({"name": "n"}));
    }

    #[tokio::test]
    async fn test_anonymous_write_is_rejected() {
        let (store, persistence) = persistence();
        let err = persistence
            .write_user_object("profile", &context(None, json!({"a": 1})))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingIdentity { ref namespace } if namespace == "profile"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_missing_bucket_is_an_error() {
        let (_, persistence) = persistence();
        let context = RequestContext::new().with_user_hash(Some("u1"));

        let err = persistence
            .get_api_object("announcements.json", &context)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingBucket));
    }

    #[tokio::test]
    async fn test_put_response_confirms_update() {
        let (store, persistence) = persistence();
        let response = persistence
            .response_for_user_object_put(
                "preferences",
                &context(Some("u2"), json!({"theme": "dark"})),
            )
            .await
            .unwrap();

        assert_eq!(
            response.json_body().unwrap(),
            json!({"result": "Preferences have been updated!"})
        );
        assert_eq!(
            store.object(BUCKET, "preferences/u2").unwrap(),
            br#"{"theme":"dark"}"#
        );
    }

    #[tokio::test]
    async fn test_api_object_get_response() {
        let (store, persistence) = persistence();
        store.insert(BUCKET, "announcements.json", r#"{"items":[]}"#);

        let response = persistence
            .response_for_api_object_get("announcements.json", &context(None, Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.json_body().unwrap(), json!({"items": []}));
    }
}
