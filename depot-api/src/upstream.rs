//! Remote project source client.
//!
//! The upstream repository-metadata service knows every project by id and
//! serves the project's full archived contents. Both calls are
//! single-attempt from the orchestrator's point of view; any retry policy
//! belongs here, not in the resolver.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use depot_core::{ProjectId, ProjectMetadata, SourceError};
use futures_util::{Stream, TryStreamExt};

use crate::config::UpstreamConfig;

/// Stream of archive bytes from the upstream source.
pub type ArchiveStream = Pin<Box<dyn Stream<Item = Result<Bytes, SourceError>> + Send>>;

/// Collaborator contract consumed by the resolution orchestrator.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Fetch the project's metadata (its name).
    async fn metadata(&self, project_id: ProjectId) -> Result<ProjectMetadata, SourceError>;

    /// Fetch the project's full archived contents as a byte stream.
    async fn fetch_archive(&self, project_id: ProjectId) -> Result<ArchiveStream, SourceError>;
}

/// HTTP implementation against the upstream service:
///
/// - `GET {base}/api/v1/projects/{id}` -> JSON `{ "projectId", "name" }`
/// - `GET {base}/api/v1/projects/{id}/download` -> binary archive stream
///
/// Any non-200 status is treated as "project not found"; connection-level
/// failures surface as transport errors.
pub struct HttpProjectSource {
    client: reqwest::Client,
    base_url: String,
    request_timeout: std::time::Duration,
}

impl HttpProjectSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                reason: format!("failed to build client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    fn project_url(&self, project_id: ProjectId) -> String {
        format!("{}/api/v1/projects/{}", self.base_url, project_id)
    }
}

#[async_trait]
impl ProjectSource for HttpProjectSource {
    async fn metadata(&self, project_id: ProjectId) -> Result<ProjectMetadata, SourceError> {
        tracing::debug!(%project_id, "fetching project metadata");
        let response = self
            .client
            .get(self.project_url(project_id))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::NotFound {
                project_id,
                status: status.as_u16(),
            });
        }

        response
            .json::<ProjectMetadata>()
            .await
            .map_err(|e| SourceError::InvalidMetadata {
                project_id,
                reason: e.to_string(),
            })
    }

    async fn fetch_archive(&self, project_id: ProjectId) -> Result<ArchiveStream, SourceError> {
        tracing::info!(%project_id, "downloading project archive");
        let response = self
            .client
            .get(format!("{}/download", self.project_url(project_id)))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::NotFound {
                project_id,
                status: status.as_u16(),
            });
        }

        let stream = response.bytes_stream().map_err(transport);
        Ok(Box::pin(stream))
    }
}

fn transport(err: reqwest::Error) -> SourceError {
    SourceError::Transport {
        reason: err.to_string(),
    }
}
