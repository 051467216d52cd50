use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::middleware::Identity;

use super::StorageBackend;

/// In-process bucket used in local mode.
pub struct MemoryStorage {
    bucket: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    reject_uploads: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
    pub owner: String,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
            reject_uploads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent upload fail, as an unavailable bucket would.
    pub fn reject_uploads(&self, reject: bool) {
        self.reject_uploads.store(reject, Ordering::SeqCst);
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn upload(
        &self,
        identity: &Identity,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<String> {
        if self.reject_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Storage("Bucket rejected the upload".to_string()));
        }

        let mut objects = self.objects.write().await;
        if objects.contains_key(key) {
            return Err(AppError::Storage("The resource already exists".to_string()));
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
                owner: identity.user_id.clone(),
            },
        );

        tracing::debug!("Memory upload: bucket={}, key={}", self.bucket, key);
        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, key)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: "user-1".to_string(),
            access_token: "token".to_string(),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_upload_and_public_url() {
        let storage = MemoryStorage::new("part-images");
        let key = storage
            .upload(&identity(), "user-1/1.jpg", b"jpeg", "image/jpeg")
            .await
            .unwrap();
        assert_eq!(storage.public_url(&key), "memory://part-images/user-1/1.jpg");

        let stored = storage.get(&key).await.unwrap();
        assert_eq!(stored.data, b"jpeg");
        assert_eq!(stored.owner, "user-1");
    }

    #[tokio::test]
    async fn test_rejected_upload() {
        let storage = MemoryStorage::new("part-images");
        storage.reject_uploads(true);
        let err = storage
            .upload(&identity(), "user-1/1.jpg", b"jpeg", "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(storage.is_empty().await);
    }
}
