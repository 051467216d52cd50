use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::http_client::HttpClient;
use crate::middleware::Identity;

/// Password sign-in against the hosted auth endpoint.
#[derive(Clone)]
pub struct SessionClient {
    http: Option<HttpClient>,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SessionClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http: Some(http) }
    }

    /// Local mode: no auth endpoint, tokens have to be issued out of band.
    pub fn disabled() -> Self {
        Self { http: None }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Identity> {
        let http = self
            .http
            .as_ref()
            .ok_or_else(|| AppError::Backend("Sign-in is not configured".to_string()))?;

        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let response = http
            .request(Method::POST, "auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant {
                email: email.trim(),
                password,
            })
            .send()
            .await?;
        let token: TokenResponse = HttpClient::check(response).await?.json().await?;

        tracing::info!(user_id = %token.user.id, "User signed in");
        Ok(Identity {
            user_id: token.user.id,
            access_token: token.access_token,
            email: token.user.email,
        })
    }
}
