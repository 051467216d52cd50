use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::Request as HttpRequest;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tower::{Layer, Service};

/// Audience carried by session tokens issued to signed-in users.
pub const SESSION_AUDIENCE: &str = "authenticated";

/// Caller identity, passed explicitly to every inventory operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
    pub email: Option<String>,
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: u64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Verify a bearer token and turn it into an [`Identity`].
pub fn verify_session_token(token: &str, secret: &str) -> Option<Identity> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[SESSION_AUDIENCE]);

    match jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Some(Identity {
            user_id: data.claims.sub,
            access_token: token.to_string(),
            email: data.claims.email,
        }),
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            None
        }
    }
}

#[derive(Clone)]
pub struct AuthLayer {
    jwt_secret: Arc<str>,
}

impl AuthLayer {
    pub fn new(jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_secret: self.jwt_secret.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_secret: Arc<str>,
}

impl<S, ReqBody> Service<HttpRequest<ReqBody>> for AuthMiddleware<S>
where
    S: Service<HttpRequest<ReqBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: HttpRequest<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();
        std::mem::swap(&mut self.inner, &mut inner);

        let jwt_secret = self.jwt_secret.clone();

        Box::pin(async move {
            let identity = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .and_then(|token| verify_session_token(token, &jwt_secret));

            // No valid token: pass through, handlers decide whether identity is required
            if let Some(identity) = identity {
                req.extensions_mut().insert(identity);
            }

            inner.call(req).await
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    pub(crate) const TEST_SECRET: &str = "test-jwt-secret";

    pub(crate) fn mint_token(user_id: &str, secret: &str, aud: &str) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            aud: aud.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as u64,
            email: Some(format!("{}@example.com", user_id)),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let token = mint_token("user-1", TEST_SECRET, SESSION_AUDIENCE);
        let identity = verify_session_token(&token, TEST_SECRET).unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.access_token, token);
        assert_eq!(identity.email.as_deref(), Some("user-1@example.com"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = mint_token("user-1", "other-secret", SESSION_AUDIENCE);
        assert!(verify_session_token(&token, TEST_SECRET).is_none());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let token = mint_token("user-1", TEST_SECRET, "anon");
        assert!(verify_session_token(&token, TEST_SECRET).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_session_token("not-a-jwt", TEST_SECRET).is_none());
    }
}
