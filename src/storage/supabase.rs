use async_trait::async_trait;
use reqwest::Method;

use crate::error::{AppError, AppResult};
use crate::http_client::HttpClient;
use crate::middleware::Identity;

use super::StorageBackend;

pub struct SupabaseStorage {
    http: HttpClient,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(http: HttpClient, bucket: String) -> Self {
        Self { http, bucket }
    }

    fn encoded_key(key: &str) -> String {
        key.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[async_trait]
impl StorageBackend for SupabaseStorage {
    async fn upload(
        &self,
        identity: &Identity,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<String> {
        let path = format!(
            "storage/v1/object/{}/{}",
            self.bucket,
            Self::encoded_key(key)
        );

        let response = self
            .http
            .request(Method::POST, &path, Some(identity))
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Image upload failed: {}", e)))?;
        HttpClient::check(response)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        tracing::info!(
            "Storage upload: bucket={}, key={}, size={}",
            self.bucket,
            key,
            data.len()
        );
        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        self.http.url(&format!(
            "storage/v1/object/public/{}/{}",
            self.bucket,
            Self::encoded_key(key)
        ))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;

    #[test]
    fn test_public_url() {
        let http = HttpClient::new(&SupabaseConfig {
            url: "https://abc.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
        })
        .unwrap();
        let storage = SupabaseStorage::new(http, "part-images".to_string());
        assert_eq!(
            storage.public_url("user-1/17.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/part-images/user-1/17.jpg"
        );
        assert_eq!(storage.bucket(), "part-images");
    }
}
