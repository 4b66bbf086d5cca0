//! Error types for the storage layer.
//!
//! Persistence is best-effort: a failed write is logged by the caller
//! and never rolls back a completed game or crashes a session.

/// Errors that can occur while persisting or querying game records.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized, or a stored line could not be
    /// parsed back.
    #[error("record serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}
