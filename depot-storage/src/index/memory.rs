//! In-memory artifact index for tests and development mode.

use std::collections::HashMap;

use async_trait::async_trait;
use depot_core::{ArtifactRecord, CommitHash, IndexError, ProjectId};
use tokio::sync::RwLock;

use super::ArtifactIndex;

/// Index adapter backed by a `HashMap` behind an async `RwLock`.
#[derive(Default)]
pub struct InMemoryIndex {
    records: RwLock<HashMap<(ProjectId, CommitHash), ArtifactRecord>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, for test assertions.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactIndex for InMemoryIndex {
    async fn find_exact(
        &self,
        project_id: ProjectId,
        commit: &CommitHash,
    ) -> Result<Option<ArtifactRecord>, IndexError> {
        let records = self.records.read().await;
        Ok(records.get(&(project_id, commit.clone())).cloned())
    }

    async fn find_any(&self, project_id: ProjectId) -> Result<Option<ArtifactRecord>, IndexError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.project_id == project_id)
            .cloned())
    }

    async fn upsert(&self, record: &ArtifactRecord) -> Result<(), IndexError> {
        let mut records = self.records.write().await;
        records
            .entry((record.project_id, record.commit_hash.clone()))
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), IndexError> {
        Ok(())
    }
}
