//! Artifact index: the system-of-record for which (project, commit)
//! pairs have already been materialized to a bundle.

mod memory;
mod postgres;

use async_trait::async_trait;
use depot_core::{ArtifactRecord, CommitHash, IndexError, ProjectId};

pub use memory::InMemoryIndex;
pub use postgres::{DbConfig, PostgresIndex};

/// Persistent lookup/insert of [`ArtifactRecord`]s.
///
/// The index is append-mostly: records are inserted once after a
/// successful checkout and never updated or deleted. Re-resolving an
/// existing pair is a cache hit at [`find_exact`](Self::find_exact) and
/// never reaches [`upsert`](Self::upsert).
#[async_trait]
pub trait ArtifactIndex: Send + Sync {
    /// The record for the exact (project, commit) pair, or `None`.
    async fn find_exact(
        &self,
        project_id: ProjectId,
        commit: &CommitHash,
    ) -> Result<Option<ArtifactRecord>, IndexError>;

    /// Any record for the project, or `None`. Used only to discover the
    /// shared working tree path without re-querying the remote source.
    async fn find_any(&self, project_id: ProjectId) -> Result<Option<ArtifactRecord>, IndexError>;

    /// Insert-if-absent. A concurrent duplicate insert for the same key
    /// is a harmless no-op; the first writer wins.
    async fn upsert(&self, record: &ArtifactRecord) -> Result<(), IndexError>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> Result<(), IndexError>;
}
