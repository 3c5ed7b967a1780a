//! Error types for the resolution pipeline.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Commit hash validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitHashError {
    #[error("commit hash must be 40 characters, got {len}")]
    BadLength { len: usize },

    #[error("commit hash must be lowercase hexadecimal: {value}")]
    BadCharacter { value: String },
}

/// Errors talking to the upstream project source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("project {project_id} not found upstream (status {status})")]
    NotFound { project_id: Uuid, status: u16 },

    #[error("transport failure talking to upstream: {reason}")]
    Transport { reason: String },

    #[error("invalid metadata payload for project {project_id}: {reason}")]
    InvalidMetadata { project_id: Uuid, reason: String },
}

/// Content store errors: filesystem I/O and external tool failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage failure at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    #[error("archive too large: {size} bytes exceeds limit of {limit}")]
    ArchiveTooLarge { size: u64, limit: u64 },

    #[error("extraction of {archive} failed: {reason}")]
    Extraction { archive: PathBuf, reason: String },

    #[error("checkout of {commit} failed: {reason}")]
    Checkout { commit: String, reason: String },
}

/// Artifact index persistence errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("index query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("index insert failed for ({project_id}, {commit}): {reason}")]
    InsertFailed {
        project_id: Uuid,
        commit: String,
        reason: String,
    },

    #[error("index backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Top-level failure of one resolution attempt.
///
/// The orchestrator never recovers from any of these locally: the attempt
/// aborts, the index stays untouched for the requested key, and the error
/// surfaces to the HTTP layer for status mapping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
