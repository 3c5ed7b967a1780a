//! Content store: filesystem layout plus the three external-tool
//! operations that populate it.
//!
//! The store has no business logic. It writes archive streams to the zip
//! staging path, expands them into the shared working tree, and produces
//! per-commit bundles. All operations take and return absolute paths from
//! the [`StoreLayout`] scheme.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use depot_core::{CommitHash, ProjectId, SourceError, StoreError};
use futures_util::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::layout::StoreLayout;
use crate::tools::{Archiver, VersionControl};

/// Filesystem + subprocess operations for one base directory.
#[derive(Clone)]
pub struct ContentStore {
    layout: StoreLayout,
    archiver: Arc<dyn Archiver>,
    vcs: Arc<dyn VersionControl>,
    max_archive_bytes: u64,
}

impl ContentStore {
    pub fn new(
        layout: StoreLayout,
        archiver: Arc<dyn Archiver>,
        vcs: Arc<dyn VersionControl>,
        max_archive_bytes: u64,
    ) -> Self {
        Self {
            layout,
            archiver,
            vcs,
            max_archive_bytes,
        }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Write a byte stream to `path`, creating parent directories and
    /// overwriting any existing file.
    ///
    /// The stream is written to a `.part` sibling and renamed into place,
    /// so a failure never leaves a partial file visible at the final path.
    /// Returns the number of bytes written.
    pub async fn save<S>(&self, path: &Path, stream: S) -> Result<u64, StoreError>
    where
        S: Stream<Item = Result<Bytes, SourceError>> + Unpin,
    {
        let parent = path
            .parent()
            .ok_or_else(|| storage_error(path, "path has no parent directory"))?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_error(parent, e))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| storage_error(path, "path has no file name"))?;
        let part = path.with_file_name(format!("{file_name}.part"));

        let result = self.write_stream(&part, stream).await;
        match result {
            Ok(written) => {
                fs::rename(&part, path)
                    .await
                    .map_err(|e| storage_error(path, e))?;
                tracing::debug!(path = %path.display(), written, "archive saved");
                Ok(written)
            }
            Err(err) => {
                let _ = fs::remove_file(&part).await;
                Err(err)
            }
        }
    }

    async fn write_stream<S>(&self, part: &Path, mut stream: S) -> Result<u64, StoreError>
    where
        S: Stream<Item = Result<Bytes, SourceError>> + Unpin,
    {
        let mut file = fs::File::create(part)
            .await
            .map_err(|e| storage_error(part, e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| storage_error(part, format!("archive stream failed: {e}")))?;
            written += chunk.len() as u64;
            if written > self.max_archive_bytes {
                return Err(StoreError::ArchiveTooLarge {
                    size: written,
                    limit: self.max_archive_bytes,
                });
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| storage_error(part, e))?;
        }

        file.flush().await.map_err(|e| storage_error(part, e))?;
        file.sync_all().await.map_err(|e| storage_error(part, e))?;
        Ok(written)
    }

    /// Expand the archive at `archive` into `dest_dir/name` and return
    /// that path.
    pub async fn extract(
        &self,
        archive: &Path,
        dest_dir: &Path,
        name: &str,
    ) -> Result<PathBuf, StoreError> {
        let target = dest_dir.join(name);
        fs::create_dir_all(&target)
            .await
            .map_err(|e| storage_error(&target, e))?;

        self.archiver
            .extract(archive, &target)
            .await
            .map_err(|e| StoreError::Extraction {
                archive: archive.to_path_buf(),
                reason: e.to_string(),
            })?;
        tracing::debug!(archive = %archive.display(), target = %target.display(), "archive extracted");
        Ok(target)
    }

    /// Check out `commit` in the working tree, bundle its `HEAD` into
    /// `dest_dir/{name}.bundle`, and hard-reset the tree.
    ///
    /// Once the checkout has mutated the tree, the reset runs regardless
    /// of whether the bundle step succeeded, so the shared tree is never
    /// left dirty for the next caller. A failed reset is surfaced as a
    /// checkout failure rather than claiming success.
    pub async fn checkout(
        &self,
        tree: &Path,
        dest_dir: &Path,
        commit: &CommitHash,
        project_id: ProjectId,
        name: &str,
    ) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| storage_error(dest_dir, e))?;

        tracing::info!(%project_id, %commit, tree = %tree.display(), "checking out commit");
        self.vcs
            .checkout(tree, commit)
            .await
            .map_err(|e| checkout_error(commit, e))?;

        let bundle = dest_dir.join(format!("{name}.bundle"));
        let bundled = self.vcs.bundle(tree, &bundle).await;
        // The tree is dirty from here on; reset before reporting anything.
        let reset = self.vcs.reset_hard(tree).await;

        bundled.map_err(|e| checkout_error(commit, e))?;
        reset.map_err(|e| StoreError::Checkout {
            commit: commit.to_string(),
            reason: format!("reset failed: {e}"),
        })?;

        tracing::info!(%project_id, %commit, bundle = %bundle.display(), "bundle created");
        Ok(bundle)
    }
}

fn storage_error(path: &Path, reason: impl ToString) -> StoreError {
    StoreError::Storage {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn checkout_error(commit: &CommitHash, reason: impl ToString) -> StoreError {
    StoreError::Checkout {
        commit: commit.to_string(),
        reason: reason.to_string(),
    }
}
