//! Shared fakes and fixtures for integration tests.
//!
//! No test in this suite spawns a real subprocess or opens a socket: the
//! upstream source, the archiver, and the version-control tool are all
//! in-process fakes that record how often they were exercised.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use depot_api::upstream::{ArchiveStream, ProjectSource};
use depot_api::{AppState, Resolver};
use depot_core::{CommitHash, ProjectId, ProjectMetadata, SourceError};
use depot_storage::tools::{Archiver, ToolError, VersionControl};
use depot_storage::{ContentStore, InMemoryIndex, StoreLayout};
use futures_util::stream;
use tempfile::TempDir;
use uuid::Uuid;

pub const PROJECT_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const PROJECT_NAME: &str = "demo";
pub const ARCHIVE_BYTES: &[u8] = b"zip bytes";

pub fn project_id() -> ProjectId {
    Uuid::parse_str(PROJECT_ID).unwrap()
}

pub fn commit_a() -> CommitHash {
    CommitHash::new("a".repeat(40)).unwrap()
}

pub fn commit_b() -> CommitHash {
    CommitHash::new("b".repeat(40)).unwrap()
}

pub fn commit_c() -> CommitHash {
    CommitHash::new("c".repeat(40)).unwrap()
}

// ============================================================================
// FAKE PROJECT SOURCE
// ============================================================================

/// Upstream fake that serves one known project and counts calls.
pub struct FakeProjectSource {
    pub known_project: ProjectId,
    pub name: String,
    pub metadata_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl FakeProjectSource {
    pub fn new() -> Self {
        Self {
            known_project: project_id(),
            name: PROJECT_NAME.to_string(),
            metadata_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProjectSource for FakeProjectSource {
    async fn metadata(&self, project_id: ProjectId) -> Result<ProjectMetadata, SourceError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if project_id != self.known_project {
            return Err(SourceError::NotFound {
                project_id,
                status: 404,
            });
        }
        Ok(ProjectMetadata {
            project_id,
            name: self.name.clone(),
        })
    }

    async fn fetch_archive(&self, project_id: ProjectId) -> Result<ArchiveStream, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if project_id != self.known_project {
            return Err(SourceError::NotFound {
                project_id,
                status: 404,
            });
        }
        let chunks = vec![
            Ok(Bytes::from_static(&ARCHIVE_BYTES[..4])),
            Ok(Bytes::from_static(&ARCHIVE_BYTES[4..])),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

// ============================================================================
// FAKE ARCHIVER
// ============================================================================

/// Archiver fake that copies the staged archive into the tree.
pub struct FakeArchiver {
    pub extract_calls: AtomicUsize,
}

impl FakeArchiver {
    pub fn new() -> Self {
        Self {
            extract_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Archiver for FakeArchiver {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ToolError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        let contents = tokio::fs::read(archive)
            .await
            .map_err(|e| ToolError::new("unzip", format!("cannot read archive: {e}")))?;
        tokio::fs::write(dest.join("contents.txt"), contents)
            .await
            .map_err(|e| ToolError::new("unzip", e.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// FAKE VERSION CONTROL
// ============================================================================

/// Version-control fake over a marker file in the working tree.
///
/// `checkout` writes the commit to `.head`, `bundle` snapshots whatever
/// `.head` holds, and `reset_hard` removes it. Commits outside
/// `known_commits` fail the same way an unknown revision would.
pub struct FakeGit {
    pub known_commits: Vec<CommitHash>,
    pub checkout_calls: AtomicUsize,
    pub bundle_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
}

impl FakeGit {
    pub fn new(known_commits: Vec<CommitHash>) -> Self {
        Self {
            known_commits,
            checkout_calls: AtomicUsize::new(0),
            bundle_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VersionControl for FakeGit {
    async fn checkout(&self, tree: &Path, commit: &CommitHash) -> Result<(), ToolError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        if !self.known_commits.contains(commit) {
            return Err(ToolError::new(
                "git",
                format!("unknown revision or path not in the working tree: {commit}"),
            ));
        }
        tokio::fs::write(tree.join(".head"), commit.as_str())
            .await
            .map_err(|e| ToolError::new("git", e.to_string()))?;
        Ok(())
    }

    async fn bundle(&self, tree: &Path, out: &Path) -> Result<(), ToolError> {
        self.bundle_calls.fetch_add(1, Ordering::SeqCst);
        let head = tokio::fs::read_to_string(tree.join(".head"))
            .await
            .map_err(|e| ToolError::new("git", format!("no checked out commit: {e}")))?;
        tokio::fs::write(out, format!("bundle of {head}"))
            .await
            .map_err(|e| ToolError::new("git", e.to_string()))?;
        Ok(())
    }

    async fn reset_hard(&self, tree: &Path) -> Result<(), ToolError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        let _ = tokio::fs::remove_file(tree.join(".head")).await;
        Ok(())
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// One resolver wired to fakes over a temp directory.
pub struct Harness {
    pub dir: TempDir,
    pub index: Arc<InMemoryIndex>,
    pub source: Arc<FakeProjectSource>,
    pub archiver: Arc<FakeArchiver>,
    pub git: Arc<FakeGit>,
    pub resolver: Arc<Resolver>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_commits(vec![commit_a(), commit_b()])
    }

    pub fn with_commits(known_commits: Vec<CommitHash>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(InMemoryIndex::new());
        let source = Arc::new(FakeProjectSource::new());
        let archiver = Arc::new(FakeArchiver::new());
        let git = Arc::new(FakeGit::new(known_commits));

        let resolver = Arc::new(build_resolver(
            dir.path(),
            index.clone(),
            source.clone(),
            archiver.clone(),
            git.clone(),
        ));

        Self {
            dir,
            index,
            source,
            archiver,
            git,
            resolver,
        }
    }

    /// A second resolver over the same directory and tools but a fresh,
    /// empty index. Models a restart that lost the index write.
    pub fn resolver_with_fresh_index(&self) -> (Arc<InMemoryIndex>, Arc<Resolver>) {
        let index = Arc::new(InMemoryIndex::new());
        let resolver = Arc::new(build_resolver(
            self.dir.path(),
            index.clone(),
            self.source.clone(),
            self.archiver.clone(),
            self.git.clone(),
        ));
        (index, resolver)
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            resolver: self.resolver.clone(),
            index: self.index.clone(),
            data_dir: self.dir.path().to_path_buf(),
        }
    }

    pub fn working_tree(&self) -> PathBuf {
        StoreLayout::new(self.dir.path()).working_tree_path(project_id(), PROJECT_NAME)
    }
}

fn build_resolver(
    base: &Path,
    index: Arc<InMemoryIndex>,
    source: Arc<FakeProjectSource>,
    archiver: Arc<FakeArchiver>,
    git: Arc<FakeGit>,
) -> Resolver {
    let store = ContentStore::new(StoreLayout::new(base), archiver, git, 1024 * 1024);
    Resolver::new(index, source, store)
}
