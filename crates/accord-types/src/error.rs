use thiserror::Error;

/// Result type shared by the sync engines and service layer.
pub type SyncResult<T> = Result<T, SyncError>;

/// Error taxonomy for contract and sync operations.
///
/// Every exposed operation returns one of these with a descriptive
/// message rather than panicking; auto-sync additionally confines its
/// failures to log lines.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("storage error: {0}")]
    Storage(String),
}
