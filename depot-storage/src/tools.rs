//! External tool seams for the content store.
//!
//! Archive extraction and version-control operations are abstracted behind
//! narrow capability traits so the store can be driven by in-process fakes
//! in tests. The system implementations shell out to `unzip` and `git` via
//! `tokio::process::Command`, always with explicit paths and an explicit
//! working directory. No invocation reads or mutates the process-wide
//! current directory.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use depot_core::CommitHash;
use thiserror::Error;
use tokio::process::Command;

/// Failure of one external tool invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{tool} failed: {reason}")]
pub struct ToolError {
    pub tool: &'static str,
    pub reason: String,
}

impl ToolError {
    pub fn new(tool: &'static str, reason: impl Into<String>) -> Self {
        Self {
            tool,
            reason: reason.into(),
        }
    }
}

/// Capability to expand an archive into a directory.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Expand `archive` into `dest`. `dest` already exists when called.
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ToolError>;
}

/// Capability to manipulate a version-controlled working tree.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Check out `commit` in the working tree at `tree`.
    async fn checkout(&self, tree: &Path, commit: &CommitHash) -> Result<(), ToolError>;

    /// Produce a portable bundle of the tree's current `HEAD` at `out`.
    async fn bundle(&self, tree: &Path, out: &Path) -> Result<(), ToolError>;

    /// Hard-reset the working tree to a clean state.
    async fn reset_hard(&self, tree: &Path) -> Result<(), ToolError>;
}

// ============================================================================
// SYSTEM IMPLEMENTATIONS
// ============================================================================

/// Archiver backed by the `unzip` command line tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemArchiver;

#[async_trait]
impl Archiver for SystemArchiver {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ToolError> {
        let output = Command::new("unzip")
            .arg("-qq")
            .arg(archive)
            .arg("-d")
            .arg(dest)
            .output()
            .await
            .map_err(|e| ToolError::new("unzip", format!("failed to spawn: {e}")))?;
        check_status("unzip", &output)
    }
}

/// Version control backed by the `git` command line tool.
///
/// Every command runs with `current_dir` set to the working tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl SystemGit {
    async fn run(&self, tree: &Path, args: &[&str]) -> Result<(), ToolError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(tree)
            .output()
            .await
            .map_err(|e| ToolError::new("git", format!("failed to spawn: {e}")))?;
        check_status("git", &output)
    }
}

#[async_trait]
impl VersionControl for SystemGit {
    async fn checkout(&self, tree: &Path, commit: &CommitHash) -> Result<(), ToolError> {
        self.run(tree, &["checkout", commit.as_str()]).await
    }

    async fn bundle(&self, tree: &Path, out: &Path) -> Result<(), ToolError> {
        let out = out.to_string_lossy();
        self.run(tree, &["bundle", "create", out.as_ref(), "HEAD"])
            .await
    }

    async fn reset_hard(&self, tree: &Path) -> Result<(), ToolError> {
        self.run(tree, &["reset", "--hard"]).await
    }
}

fn check_status(tool: &'static str, output: &Output) -> Result<(), ToolError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(ToolError::new(
        tool,
        format!("{}: {}", output.status, stderr.trim()),
    ))
}
