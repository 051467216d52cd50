// Object storage for part images

pub mod memory;
pub mod supabase;

pub use memory::MemoryStorage;
pub use supabase::SupabaseStorage;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::middleware::Identity;

/// Bucket holding part images. The row only keeps the public URL; the bucket owns the bytes.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store `data` under `key`. Returns the stored key
    async fn upload(
        &self,
        identity: &Identity,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<String>;

    /// Publicly fetchable URL for an uploaded key
    fn public_url(&self, key: &str) -> String;

    fn bucket(&self) -> &str;
}

/// Key under the caller's namespace: `{user_id}/{unix_millis}.{ext}`.
pub fn object_key(user_id: &str, file_name: &str, timestamp_millis: i64) -> String {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("jpg");
    format!("{}/{}.{}", user_id, timestamp_millis, ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        assert_eq!(
            object_key("user-1", "brake.JPG", 1_700_000_000_000),
            "user-1/1700000000000.jpg"
        );
        assert_eq!(object_key("user-1", "photo", 5), "user-1/5.jpg");
        assert_eq!(object_key("u", "a.b.webp", 5), "u/5.webp");
    }
}
