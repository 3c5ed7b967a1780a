//! Depot Storage - Content Store and Artifact Index
//!
//! This crate owns everything below the resolution orchestrator:
//! - the deterministic on-disk layout for a project (`layout`),
//! - the external tool seams for archive extraction and version control
//!   operations (`tools`),
//! - the content store composing both into save/extract/checkout (`store`),
//! - the artifact index trait with in-memory and PostgreSQL adapters
//!   (`index`).
//!
//! Nothing in this crate makes resolution decisions; that logic lives in
//! the API crate.

pub mod index;
pub mod layout;
pub mod store;
pub mod tools;

pub use index::{ArtifactIndex, DbConfig, InMemoryIndex, PostgresIndex};
pub use layout::StoreLayout;
pub use store::ContentStore;
pub use tools::{Archiver, SystemArchiver, SystemGit, ToolError, VersionControl};
