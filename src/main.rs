use std::sync::Arc;

use anyhow::Context;
use parts_inventory::backend::{MemoryTable, PartsTable, RestTable};
use parts_inventory::config::Config;
use parts_inventory::http_client::HttpClient;
use parts_inventory::inventory::InventoryClient;
use parts_inventory::services::{self, AppState};
use parts_inventory::session::SessionClient;
use parts_inventory::storage::{MemoryStorage, StorageBackend, SupabaseStorage};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parts_inventory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("SUPABASE_JWT_SECRET must be set")?;

    tracing::info!("Starting parts-inventory server...");

    // Remote table, bucket and sign-in when the hosted backend is configured
    let (table, storage, sessions) = if let Some(supabase) = &config.supabase {
        tracing::info!(
            "Backend enabled: url={}, table={}",
            supabase.url,
            config.parts_table
        );
        let http = HttpClient::new(supabase)?;
        let table: Arc<dyn PartsTable> =
            Arc::new(RestTable::new(http.clone(), config.parts_table.clone()));
        let storage: Arc<dyn StorageBackend> =
            Arc::new(SupabaseStorage::new(http.clone(), config.parts_bucket.clone()));
        (table, storage, SessionClient::new(http))
    } else {
        tracing::warn!("SUPABASE_URL / SUPABASE_ANON_KEY not set, using in-memory inventory store");
        let table: Arc<dyn PartsTable> = Arc::new(MemoryTable::new(config.parts_table.clone()));
        let storage: Arc<dyn StorageBackend> =
            Arc::new(MemoryStorage::new(config.parts_bucket.clone()));
        (table, storage, SessionClient::disabled())
    };
    tracing::info!("Part images stored in bucket {}", storage.bucket());

    let state = AppState::new(
        InventoryClient::new(table, storage),
        sessions,
        config.max_image_size_mb,
    );
    let app = services::router(state, &config.jwt_secret, &config.base_path);

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    tracing::info!(
        "Listening on {} (base path {})",
        listener.local_addr()?,
        config.base_path
    );

    axum::serve(listener, app).await?;

    Ok(())
}
