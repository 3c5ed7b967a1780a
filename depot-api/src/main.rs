//! Depot API Server Entry Point
//!
//! Bootstraps configuration, selects the artifact index backend, wires
//! the content store and upstream client into the resolver, and starts
//! the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use depot_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, HttpProjectSource, IndexBackend,
    Resolver, StoreConfig, UpstreamConfig,
};
use depot_storage::{
    ArtifactIndex, ContentStore, DbConfig, InMemoryIndex, PostgresIndex, StoreLayout,
    SystemArchiver, SystemGit,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let filter = EnvFilter::try_from_env("DEPOT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api_config = ApiConfig::from_env();
    let store_config = StoreConfig::from_env();
    let upstream_config = UpstreamConfig::from_env();

    let index: Arc<dyn ArtifactIndex> = match IndexBackend::from_env() {
        IndexBackend::Memory => {
            tracing::warn!("using in-memory artifact index; records are lost on restart");
            Arc::new(InMemoryIndex::new())
        }
        IndexBackend::Postgres => {
            let db_config = DbConfig::from_env();
            let index = PostgresIndex::connect(&db_config).await.map_err(|e| {
                ApiError::service_unavailable(format!("Failed to connect artifact index: {e}"))
            })?;
            Arc::new(index)
        }
    };

    tokio::fs::create_dir_all(&store_config.data_dir)
        .await
        .map_err(|e| {
            ApiError::internal_error(format!(
                "Failed to create data directory {}: {e}",
                store_config.data_dir.display()
            ))
        })?;

    let store = ContentStore::new(
        StoreLayout::new(store_config.data_dir.clone()),
        Arc::new(SystemArchiver),
        Arc::new(SystemGit),
        store_config.max_archive_bytes,
    );
    let source = Arc::new(
        HttpProjectSource::new(&upstream_config)
            .map_err(|e| ApiError::internal_error(format!("Failed to build upstream client: {e}")))?,
    );
    let resolver = Arc::new(Resolver::new(index.clone(), source, store));

    let state = AppState {
        resolver,
        index,
        data_dir: store_config.data_dir,
    };
    let app = create_api_router(state);

    let addr: SocketAddr = format!("{}:{}", api_config.bind_host, api_config.bind_port)
        .parse()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address: {e}")))?;
    tracing::info!(%addr, upstream = %upstream_config.base_url, "Starting Depot bundle server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on ctrl-c; in-flight requests are allowed to finish.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
