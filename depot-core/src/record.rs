//! Artifact record and identifier types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommitHashError;
use crate::{ProjectId, Timestamp};

/// A validated 40-character lowercase hexadecimal commit hash.
///
/// Construction goes through [`CommitHash::new`] (or `FromStr`), so any
/// value of this type is known to be well-formed. The inner string is
/// never exposed mutably.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitHash(String);

impl CommitHash {
    pub const LEN: usize = 40;

    /// Validate and wrap a commit hash.
    pub fn new(raw: impl Into<String>) -> Result<Self, CommitHashError> {
        let raw = raw.into();
        if raw.len() != Self::LEN {
            return Err(CommitHashError::BadLength { len: raw.len() });
        }
        if !raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CommitHashError::BadCharacter { value: raw });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommitHash {
    type Err = CommitHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CommitHash {
    type Error = CommitHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommitHash> for String {
    fn from(hash: CommitHash) -> Self {
        hash.0
    }
}

/// Project metadata returned by the upstream repository service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub project_id: ProjectId,
    pub name: String,
}

/// One row per materialized commit bundle.
///
/// A record exists in the index iff its `bundle_path` file is complete on
/// disk. Records are written once, after a successful checkout, and are
/// never updated or deleted by this service. All records for a project
/// share the same `project_name` and `working_tree_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub project_id: ProjectId,
    pub commit_hash: CommitHash,
    pub project_name: String,
    pub working_tree_path: PathBuf,
    pub bundle_path: PathBuf,
    pub created_at: Timestamp,
}

impl ArtifactRecord {
    pub fn new(
        project_id: ProjectId,
        commit_hash: CommitHash,
        project_name: impl Into<String>,
        working_tree_path: PathBuf,
        bundle_path: PathBuf,
    ) -> Self {
        Self {
            project_id,
            commit_hash,
            project_name: project_name.into(),
            working_tree_path,
            bundle_path,
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_hash_accepts_lowercase_hex() {
        let hash = CommitHash::new("a".repeat(40)).unwrap();
        assert_eq!(hash.as_str().len(), 40);
    }

    #[test]
    fn test_commit_hash_rejects_wrong_length() {
        let err = CommitHash::new("abc123").unwrap_err();
        assert!(matches!(err, CommitHashError::BadLength { len: 6 }));
    }

    #[test]
    fn test_commit_hash_rejects_uppercase_and_non_hex() {
        assert!(CommitHash::new("A".repeat(40)).is_err());
        assert!(CommitHash::new("g".repeat(40)).is_err());
        assert!(CommitHash::new(format!("{}!", "a".repeat(39))).is_err());
    }

    #[test]
    fn test_commit_hash_serde_round_trip() {
        let hash = CommitHash::new("0123456789abcdef0123456789abcdef01234567").unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        let back: CommitHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_commit_hash_deserialization_validates() {
        let result: Result<CommitHash, _> = serde_json::from_str("\"not-a-sha\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_project_metadata_uses_upstream_field_names() {
        let json = r#"{"projectId":"11111111-1111-1111-1111-111111111111","name":"demo"}"#;
        let meta: ProjectMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.name, "demo");
    }
}
