//! Shared application state for Axum routers.

use std::path::PathBuf;
use std::sync::Arc;

use depot_storage::ArtifactIndex;

use crate::resolver::Resolver;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The resolution orchestrator.
    pub resolver: Arc<Resolver>,
    /// The artifact index, exposed for health checks.
    pub index: Arc<dyn ArtifactIndex>,
    /// Content store base directory, exposed for health checks.
    pub data_dir: PathBuf,
}
