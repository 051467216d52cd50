use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::config::SupabaseConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::Identity;

/// Shared HTTP client for the hosted backend's REST, storage and auth endpoints.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

/// Error body returned by the backend's REST endpoints.
#[derive(Debug, Default, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpClient {
    pub fn new(config: &SupabaseConfig) -> AppResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request carrying the project key and, when present, the caller's session token.
    pub fn request(&self, method: Method, path: &str, identity: Option<&Identity>) -> RequestBuilder {
        let bearer = identity
            .map(|i| i.access_token.as_str())
            .unwrap_or(self.anon_key.as_str());

        self.client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Pass 2xx responses through; turn anything else into a `Backend` error
    /// carrying the backend's own message.
    pub async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: BackendErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or(body.msg)
            .or(body.error_description)
            .or(body.error)
            .unwrap_or(text);

        tracing::warn!(status = %status, "Backend request failed: {}", message);
        Err(AppError::Backend(message))
    }
}
