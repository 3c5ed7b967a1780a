//! Depot API - HTTP Layer and Resolution Orchestrator
//!
//! Resolves (project id, commit hash) pairs to downloadable git bundle
//! artifacts. A project's source is fetched and materialized once; every
//! subsequent commit request reuses the shared working tree and only pays
//! for a checkout. The single download endpoint sits on top of the
//! resolver; everything stateful lives in `depot-storage`.

pub mod config;
pub mod error;
pub mod resolver;
pub mod routes;
pub mod state;
pub mod upstream;

pub use config::{ApiConfig, IndexBackend, StoreConfig, UpstreamConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use resolver::{ProjectLocks, Resolver};
pub use state::AppState;
pub use upstream::{ArchiveStream, HttpProjectSource, ProjectSource};

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the service router: the download endpoint, health endpoints,
/// permissive CORS, and request tracing.
pub fn create_api_router(state: AppState) -> Router {
    let health = routes::health::create_router(state.index.clone(), state.data_dir.clone());

    Router::new()
        .route(
            "/api/v1/projects/:id/:commit/download",
            get(routes::bundle::download_bundle),
        )
        .with_state(state)
        .nest("/health", health)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
