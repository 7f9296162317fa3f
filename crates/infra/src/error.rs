//! Store error model.

use itemstore_core::DomainError;
use thiserror::Error;

/// Result type used by every store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level fault.
///
/// Primary-key conflicts on insert and missing rows on update/delete are not
/// errors; they are reported through the operation's return value.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record was rejected before reaching the backend.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The SQLite backend reported a fault (I/O, corruption, constraint).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No key is left to auto-assign: the largest possible key was already used.
    #[error("item key space exhausted")]
    KeySpaceExhausted,

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The background write task panicked or was cancelled by the runtime.
    #[error("write task aborted: {0}")]
    WriteAborted(String),

    /// Store configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
