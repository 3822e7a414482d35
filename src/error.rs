//! Photo Exporter - Error Types

use thiserror::Error;

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Outbound error kinds.
///
/// Every failure of the save pipeline ends up as one of these and is turned
/// into a structured reply. None of them is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    // ═══════════════════════════════════════════════════════════════
    // REQUEST ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("{message}")]
    InvalidArguments { message: String },

    // ═══════════════════════════════════════════════════════════════
    // AUTHORIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("{message}")]
    PermissionDenied { message: String },

    #[error("{message} (status {status})")]
    PermissionUnknown { status: i64, message: String },

    // ═══════════════════════════════════════════════════════════════
    // WRITE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("{message}")]
    SaveFailed { message: String },
}

impl ExportError {
    /// Wire code reported to the host
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::InvalidArguments { .. } => "invalid_arguments",
            ExportError::PermissionDenied { .. } => "permission_denied",
            ExportError::PermissionUnknown { .. } => "permission_unknown",
            ExportError::SaveFailed { .. } => "save_failed",
        }
    }

    /// Human-readable message reported to the host
    pub fn message(&self) -> &str {
        match self {
            ExportError::InvalidArguments { message }
            | ExportError::PermissionDenied { message }
            | ExportError::PermissionUnknown { message, .. }
            | ExportError::SaveFailed { message } => message,
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
