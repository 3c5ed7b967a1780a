//! Depot Core - Domain Types
//!
//! Pure data structures shared by every other crate: the artifact record
//! kept in the index, the validated commit-hash newtype, and the error
//! taxonomy for the resolution pipeline. No business logic lives here.

pub mod error;
pub mod record;

pub use error::{CommitHashError, IndexError, ResolveError, SourceError, StoreError};
pub use record::{ArtifactRecord, CommitHash, ProjectMetadata};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Opaque project identifier assigned by the upstream metadata service.
pub type ProjectId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
