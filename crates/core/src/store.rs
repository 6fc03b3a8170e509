//! Port-level storage error.

use thiserror::Error;

/// Error reported by a persistence port.
///
/// `DuplicateKey` is the race-safe idempotency signal: a store raising it on
/// insert means a uniqueness invariant already holds for the row. Callers are
/// expected to convert it into their own "already exists" outcome rather than
/// surface it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A store-enforced uniqueness invariant was violated at insert time.
    #[error("duplicate key")]
    DuplicateKey,

    /// The referenced row does not exist.
    #[error("record not found")]
    NotFound,

    /// The store failed or is unreachable. Retryable by the caller.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
