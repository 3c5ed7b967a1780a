//! Bundle Download Route
//!
//! This module implements the single artifact endpoint:
//! `GET /api/v1/projects/{id}/{commit}/download`. The handler validates
//! the path parameters, hands the pair to the resolver, and streams the
//! resulting bundle file back to the caller.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use depot_core::CommitHash;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/projects/{id}/{commit}/download - Download a commit bundle
pub async fn download_bundle(
    State(state): State<AppState>,
    Path((id, commit)): Path<(String, String)>,
) -> ApiResult<Response> {
    let project_id =
        Uuid::parse_str(&id).map_err(|_| ApiError::invalid_format("id", "a UUID"))?;
    let commit: CommitHash = commit
        .parse()
        .map_err(|_| ApiError::invalid_format("commit", "40-character lowercase hex"))?;

    tracing::info!(%project_id, %commit, "bundle requested");
    let record = state.resolver.resolve(project_id, &commit).await?;

    // The resolver only returns records whose bundle is complete on disk.
    let file = tokio::fs::File::open(&record.bundle_path)
        .await
        .map_err(|e| {
            tracing::error!(bundle = %record.bundle_path.display(), "bundle missing on disk: {e}");
            ApiError::internal_error("Bundle file unavailable")
        })?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.bundle\"", record.project_name),
        ),
    ];
    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body).into_response())
}
