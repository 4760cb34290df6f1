use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use folio_api::blob::LocalBlobStore;
use folio_api::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use folio_api::{app, config, is_production, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = config::config().clone();
    info!("Starting Folio API in {:?} mode", config.environment);

    if is_production!() && config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set in production");
    }

    let documents: Arc<dyn DocumentStore> = match &config.storage.database_url {
        Some(url) => Arc::new(
            PgDocumentStore::connect(url, config.storage.max_connections)
                .await
                .context("failed to connect document store")?,
        ),
        None => {
            warn!("DATABASE_URL not set, documents are kept in memory");
            Arc::new(MemoryDocumentStore::new())
        }
    };
    let blobs = Arc::new(LocalBlobStore::new(
        &config.storage.blob_dir,
        &config.storage.blob_base_url,
    ));

    let port = config.api.port;
    let state = AppState::new(config, documents, blobs);
    if let Err(e) = state.portfolio.load_all().await {
        warn!("Initial load failed, collections will load on first use: {}", e);
    }

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Folio API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
