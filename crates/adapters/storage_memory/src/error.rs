//! Storage-specific error type.

use sleephub_domain::error::HubError;

/// Errors originating from the in-memory storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A writer panicked while holding the store lock.
    #[error("{store} store lock poisoned")]
    Poisoned {
        /// Which store was affected (`"entity"`, `"device"`).
        store: &'static str,
    },
}

impl From<StorageError> for HubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
