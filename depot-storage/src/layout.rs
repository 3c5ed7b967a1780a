//! Deterministic on-disk layout for project materializations.
//!
//! Every path is a pure function of the base directory, the project id,
//! the commit, and the project name:
//!
//! ```text
//! {base}/{project_id}/zip/{name}.zip       staged archive
//! {base}/{project_id}/unzip/{name}/        shared working tree
//! {base}/{project_id}/{commit}/{name}.bundle   per-commit bundle
//! ```
//!
//! Other tooling depends on this scheme, so changes here are breaking.

use std::path::{Path, PathBuf};

use depot_core::{CommitHash, ProjectId};

/// Path scheme rooted at a configured base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    base: PathBuf,
}

impl StoreLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding everything for one project.
    pub fn project_dir(&self, project_id: ProjectId) -> PathBuf {
        self.base.join(project_id.to_string())
    }

    /// Staging location for the downloaded archive.
    pub fn zip_path(&self, project_id: ProjectId, name: &str) -> PathBuf {
        self.project_dir(project_id)
            .join("zip")
            .join(format!("{name}.zip"))
    }

    /// Parent directory of the working tree.
    pub fn unzip_dir(&self, project_id: ProjectId) -> PathBuf {
        self.project_dir(project_id).join("unzip")
    }

    /// The shared working tree, one per project.
    pub fn working_tree_path(&self, project_id: ProjectId, name: &str) -> PathBuf {
        self.unzip_dir(project_id).join(name)
    }

    /// Directory holding one commit's bundle.
    pub fn commit_dir(&self, project_id: ProjectId, commit: &CommitHash) -> PathBuf {
        self.project_dir(project_id).join(commit.as_str())
    }

    /// The bundle artifact for one commit.
    pub fn bundle_path(&self, project_id: ProjectId, commit: &CommitHash, name: &str) -> PathBuf {
        self.commit_dir(project_id, commit)
            .join(format!("{name}.bundle"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn fixture() -> (StoreLayout, ProjectId, CommitHash) {
        let layout = StoreLayout::new("/data");
        let project_id = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        let commit = CommitHash::new("a".repeat(40)).unwrap();
        (layout, project_id, commit)
    }

    #[test]
    fn test_zip_path_scheme() {
        let (layout, project_id, _) = fixture();
        assert_eq!(
            layout.zip_path(project_id, "demo"),
            PathBuf::from("/data/11111111-1111-1111-1111-111111111111/zip/demo.zip")
        );
    }

    #[test]
    fn test_working_tree_path_is_commit_independent() {
        let (layout, project_id, _) = fixture();
        assert_eq!(
            layout.working_tree_path(project_id, "demo"),
            PathBuf::from("/data/11111111-1111-1111-1111-111111111111/unzip/demo")
        );
    }

    #[test]
    fn test_bundle_path_scheme() {
        let (layout, project_id, commit) = fixture();
        assert_eq!(
            layout.bundle_path(project_id, &commit, "demo"),
            PathBuf::from(format!(
                "/data/11111111-1111-1111-1111-111111111111/{}/demo.bundle",
                "a".repeat(40)
            ))
        );
    }

    #[test]
    fn test_paths_are_deterministic() {
        let (layout, project_id, commit) = fixture();
        assert_eq!(
            layout.bundle_path(project_id, &commit, "demo"),
            layout.bundle_path(project_id, &commit, "demo")
        );
    }
}
