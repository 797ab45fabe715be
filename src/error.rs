//! Error types for afftrack
//!
//! Provides a unified error type for all operations.
//!
//! Storage faults never reach callers of the tiered store or the ledger;
//! they are carried as diagnostics in [`StoreOutcome`](crate::store::StoreOutcome)
//! and in logs. Request-building operations return them directly.

use thiserror::Error;

use crate::backend::BackendKind;

/// Result type alias using AttributionError
pub type Result<T> = std::result::Result<T, AttributionError>;

/// Unified error type for afftrack operations
#[derive(Debug, Error)]
pub enum AttributionError {
    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} storage failed: {1}")]
    Backend(BackendKind, String),

    #[error("{0} storage is unavailable")]
    BackendUnavailable(BackendKind),

    // -------------------------------------------------------------------------
    // Tiered Store Errors
    // -------------------------------------------------------------------------
    #[error("write to {0} storage failed: {1}")]
    WriteFailed(BackendKind, String),

    #[error("corrupt entry for key '{key}' in {backend} storage: {reason}")]
    CorruptEntry {
        backend: BackendKind,
        key: String,
        reason: String,
    },

    #[error("all storage methods failed")]
    AllBackendsFailed,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Tracking Request Errors
    // -------------------------------------------------------------------------
    #[error("Missing required parameters: {0}")]
    MissingRequiredParams(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AttributionError {
    /// Stable machine-readable code, one per variant family
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Backend(..) | Self::WriteFailed(..) => "STORAGE_ERROR",
            Self::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Self::CorruptEntry { .. } => "CORRUPT_ENTRY",
            Self::AllBackendsFailed => "ALL_BACKENDS_FAILED",
            Self::Serialization(_) | Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::MissingRequiredParams(_) => "MISSING_REQUIRED_PARAMS",
            Self::Url(_) | Self::Config(_) => "CONFIG_ERROR",
        }
    }
}
