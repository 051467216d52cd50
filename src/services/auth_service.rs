use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::FormError;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInRes {
    pub access_token: String,
    pub user_id: String,
    pub email: Option<String>,
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInReq>,
) -> Result<Json<SignInRes>, FormError> {
    let identity = state
        .sessions
        .sign_in(&req.email, &req.password)
        .await
        .map_err(|e| e.or_notice("Error signing in"))?;

    Ok(Json(SignInRes {
        access_token: identity.access_token,
        user_id: identity.user_id,
        email: identity.email,
    }))
}
