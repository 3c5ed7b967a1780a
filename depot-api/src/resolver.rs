//! Resolution orchestrator: the core state machine.
//!
//! Given a (project id, commit) pair, drive the content store, the remote
//! project source, and the artifact index through the minimum necessary
//! work to produce a bundle path:
//!
//! 1. CacheExact - index lookup; a hit is terminal.
//! 2. Identify - fetch the project name from the upstream source.
//! 3. TreeCheck - does the shared working tree already exist?
//! 4. FetchAndExtract - download and expand the archive (first time only).
//! 5. Checkout - produce the commit's bundle from the shared tree.
//! 6. Commit - record the artifact in the index, then return.
//!
//! The index write is deliberately the last action, so the index never
//! advertises an artifact that is not complete on disk. Any failure
//! aborts the attempt and leaves the index untouched for that key.

use std::sync::Arc;

use dashmap::DashMap;
use depot_core::{ArtifactRecord, CommitHash, ProjectId, ResolveError};
use depot_storage::{ArtifactIndex, ContentStore};
use tokio::sync::Mutex;

use crate::upstream::ProjectSource;

/// Per-project mutual exclusion for working-tree mutations.
///
/// The shared working tree is a single mutable filesystem location reused
/// across commits; checkout mutates it in place. All store mutations for
/// a project run under this lock, which also gives at-most-one concurrent
/// materialization: a second first-time request for the same project
/// waits for the first's fetch+extract and then finds the tree present.
#[derive(Clone, Default)]
pub struct ProjectLocks {
    inner: Arc<DashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, project_id: ProjectId) -> Arc<Mutex<()>> {
        self.inner.entry(project_id).or_default().clone()
    }
}

/// Drives one resolution attempt per call. Cheap to clone and share.
pub struct Resolver {
    index: Arc<dyn ArtifactIndex>,
    source: Arc<dyn ProjectSource>,
    store: ContentStore,
    locks: ProjectLocks,
}

impl Resolver {
    pub fn new(
        index: Arc<dyn ArtifactIndex>,
        source: Arc<dyn ProjectSource>,
        store: ContentStore,
    ) -> Self {
        Self {
            index,
            source,
            store,
            locks: ProjectLocks::new(),
        }
    }

    /// Resolve a (project, commit) pair to its materialized artifact.
    ///
    /// Idempotent: a pair that has been resolved before is a pure cache
    /// hit with no network or subprocess activity.
    pub async fn resolve(
        &self,
        project_id: ProjectId,
        commit: &CommitHash,
    ) -> Result<ArtifactRecord, ResolveError> {
        if let Some(record) = self.index.find_exact(project_id, commit).await? {
            tracing::debug!(%project_id, %commit, "bundle cache hit");
            return Ok(record);
        }

        let lock = self.locks.lock_for(project_id);
        let _guard = lock.lock().await;

        // Another request may have materialized the pair while we waited.
        if let Some(record) = self.index.find_exact(project_id, commit).await? {
            tracing::debug!(%project_id, %commit, "bundle materialized while waiting for lock");
            return Ok(record);
        }

        let metadata = self.source.metadata(project_id).await?;
        let working_tree = self.ensure_working_tree(project_id, &metadata.name).await?;

        let commit_dir = self.store.layout().commit_dir(project_id, commit);
        let bundle_path = self
            .store
            .checkout(&working_tree, &commit_dir, commit, project_id, &metadata.name)
            .await?;

        let record = ArtifactRecord::new(
            project_id,
            commit.clone(),
            metadata.name,
            working_tree,
            bundle_path,
        );
        self.index.upsert(&record).await?;
        tracing::info!(%project_id, %commit, bundle = %record.bundle_path.display(), "artifact recorded");
        Ok(record)
    }

    /// TreeCheck + FetchAndExtract. Returns the working tree path.
    ///
    /// The index is consulted first; if it knows nothing (including after
    /// a crash between checkout and upsert), an on-disk check of the
    /// working-tree path decides whether the fetch can be skipped.
    async fn ensure_working_tree(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<std::path::PathBuf, ResolveError> {
        if let Some(existing) = self.index.find_any(project_id).await? {
            tracing::debug!(%project_id, "working tree known to index");
            return Ok(existing.working_tree_path);
        }

        let layout = self.store.layout();
        let tree = layout.working_tree_path(project_id, name);
        if tokio::fs::try_exists(&tree).await.unwrap_or(false) {
            tracing::debug!(%project_id, tree = %tree.display(), "working tree found on disk");
            return Ok(tree);
        }

        let zip_path = layout.zip_path(project_id, name);
        let archive = self.source.fetch_archive(project_id).await?;
        self.store.save(&zip_path, archive).await?;
        let tree = self
            .store
            .extract(&zip_path, &layout.unzip_dir(project_id), name)
            .await?;
        tracing::info!(%project_id, tree = %tree.display(), "project materialized");
        Ok(tree)
    }
}
