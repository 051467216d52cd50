pub mod auth_service;
pub mod health_service;
pub mod parts_service;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::{Extension, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, AppResult};
use crate::inventory::InventoryClient;
use crate::middleware::{AuthLayer, Identity};
use crate::models::Part;
use crate::session::SessionClient;

/// Upper bound for request bodies; part photos straight from a phone camera fit.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryClient,
    pub sessions: SessionClient,
    pub max_image_size_mb: f64,
}

impl AppState {
    pub fn new(inventory: InventoryClient, sessions: SessionClient, max_image_size_mb: f64) -> Arc<Self> {
        Arc::new(Self {
            inventory,
            sessions,
            max_image_size_mb,
        })
    }
}

/// Result of a completed form action.
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<Part>,
}

impl FormResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            part: None,
        }
    }

    pub fn with_part(message: impl Into<String>, part: Part) -> Self {
        Self {
            message: message.into(),
            part: Some(part),
        }
    }
}

/// A form field as typed by the user; browsers send either a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormInput {
    Text(String),
    Number(serde_json::Number),
}

impl FormInput {
    pub fn as_text(&self) -> String {
        match self {
            FormInput::Text(s) => s.clone(),
            FormInput::Number(n) => n.to_string(),
        }
    }
}

fn require_identity(identity: Option<Extension<Identity>>) -> AppResult<Identity> {
    identity
        .map(|Extension(identity)| identity)
        .ok_or_else(AppError::unauthenticated)
}

/// Full application router, nested under `base_path` (already normalized).
pub fn router(state: Arc<AppState>, jwt_secret: &str, base_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let app = Router::new()
        .route("/health", get(health_service::check))
        .route("/api/auth/sign-in", post(auth_service::sign_in))
        .route("/api/dashboard", get(parts_service::dashboard))
        .route(
            "/api/parts",
            get(parts_service::list_parts).post(parts_service::add_part),
        )
        .route("/api/parts/search", get(parts_service::search_part))
        .route("/api/parts/:id", delete(parts_service::delete_part))
        .route("/api/parts/:id/stock", patch(parts_service::update_stock))
        .route("/api/parts/:id/price", patch(parts_service::update_price))
        .with_state(state)
        .layer(AuthLayer::new(jwt_secret))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let prefix = base_path.trim_end_matches('/');
    if prefix.is_empty() {
        app
    } else {
        Router::new().nest(prefix, app)
    }
}
