//! Error Types for the Depot API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum mapping error kinds to HTTP status codes
//! - IntoResponse implementation for Axum
//!
//! All errors are serialized as JSON bodies carrying a `message` field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use depot_core::{IndexError, ResolveError, SourceError, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each code maps an error kind from the resolution pipeline to a
/// specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request path parameter failed validation
    InvalidFormat,

    /// Request contains invalid input data
    InvalidInput,

    /// Upstream metadata service does not know the project
    ProjectNotFound,

    /// Requested commit does not resolve in the project's history
    CommitUnresolved,

    /// Network failure talking to the upstream project source
    UpstreamUnavailable,

    /// Archive missing, corrupt, or extraction tool failure
    ExtractionFailed,

    /// Local filesystem I/O failure
    StorageFailed,

    /// Artifact index persistence failure
    IndexFailed,

    /// Internal server error
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidFormat | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,

            ErrorCode::ProjectNotFound => StatusCode::NOT_FOUND,

            ErrorCode::CommitUnresolved => StatusCode::UNPROCESSABLE_ENTITY,

            ErrorCode::UpstreamUnavailable => StatusCode::BAD_GATEWAY,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::ExtractionFailed
            | ErrorCode::StorageFailed
            | ErrorCode::IndexFailed
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::CommitUnresolved => "Commit does not resolve in this project",
            ErrorCode::UpstreamUnavailable => "Upstream project source unavailable",
            ErrorCode::ExtractionFailed => "Archive extraction failed",
            ErrorCode::StorageFailed => "Storage operation failed",
            ErrorCode::IndexFailed => "Artifact index operation failed",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    /// Create an InvalidFormat error.
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a ProjectNotFound error.
    pub fn project_not_found() -> Self {
        Self::from_code(ErrorCode::ProjectNotFound)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM PIPELINE ERRORS
// ============================================================================

/// Map a resolution failure onto the kind-aware HTTP status scheme.
impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Source(source) => source.into(),
            ResolveError::Store(store) => store.into(),
            ResolveError::Index(index) => index.into(),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound { .. } => {
                tracing::warn!("upstream lookup failed: {err}");
                ApiError::from_code(ErrorCode::ProjectNotFound)
            }
            SourceError::Transport { .. } | SourceError::InvalidMetadata { .. } => {
                tracing::error!("upstream failure: {err}");
                ApiError::from_code(ErrorCode::UpstreamUnavailable)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Checkout { .. } => {
                tracing::warn!("checkout failed: {err}");
                ApiError::from_code(ErrorCode::CommitUnresolved)
            }
            StoreError::Extraction { .. } => {
                tracing::error!("extraction failed: {err}");
                ApiError::from_code(ErrorCode::ExtractionFailed)
            }
            StoreError::Storage { .. } | StoreError::ArchiveTooLarge { .. } => {
                tracing::error!("storage failure: {err}");
                ApiError::from_code(ErrorCode::StorageFailed)
            }
        }
    }
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        tracing::error!("index failure: {err}");
        ApiError::from_code(ErrorCode::IndexFailed)
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidFormat.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ProjectNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::CommitUnresolved.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::UpstreamUnavailable.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorCode::StorageFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_resolve_error_kind_mapping() {
        let err: ApiError = ResolveError::from(SourceError::NotFound {
            project_id: Uuid::new_v4(),
            status: 404,
        })
        .into();
        assert_eq!(err.code, ErrorCode::ProjectNotFound);
        assert_eq!(err.message, "Project not found");

        let err: ApiError = ResolveError::from(SourceError::Transport {
            reason: "connection refused".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);

        let err: ApiError = ResolveError::from(StoreError::Checkout {
            commit: "a".repeat(40),
            reason: "unknown revision".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::CommitUnresolved);

        let err: ApiError = ResolveError::from(StoreError::Extraction {
            archive: PathBuf::from("/data/demo.zip"),
            reason: "exit status 9".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ExtractionFailed);

        let err: ApiError = ResolveError::from(IndexError::QueryFailed {
            reason: "connection lost".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::IndexFailed);
    }

    #[test]
    fn test_error_serialization_carries_message() -> Result<(), serde_json::Error> {
        let err = ApiError::project_not_found();
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("\"message\":\"Project not found\""));
        assert!(json.contains("PROJECT_NOT_FOUND"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_invalid_format_names_the_field() {
        let err = ApiError::invalid_format("commit", "40-character lowercase hex");
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(err.message.contains("commit"));
        assert!(err.message.contains("40-character"));
    }
}
