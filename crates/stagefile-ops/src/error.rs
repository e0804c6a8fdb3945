//! Session error types.

use stagefile_core::{ErrorKind, StoreError};
use thiserror::Error;

/// Errors returned by session commands.
///
/// Single-item commands return these directly and leave the session
/// untouched. Batch commands only return them for preconditions; per-item
/// failures end up in the batch report instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpsError {
    /// The command needs at least one selected item.
    #[error("Nothing is selected")]
    NoSelection,

    /// The command needs an exact number of selected items.
    #[error("Select exactly {expected} item(s); {actual} selected")]
    InvalidSelection { expected: usize, actual: usize },

    /// The path is not part of the current listing.
    #[error("Not in the current directory: {path}")]
    NotListed { path: String },

    /// Commit was requested with no pending batch.
    #[error("No copy or move is pending")]
    NothingPending,

    /// Mark was requested while a batch is pending and re-marking is refused.
    #[error("A batch of {count} item(s) is already pending")]
    PendingBatchExists { count: usize },

    /// A user-supplied name is unusable.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Another mutating command is still running.
    #[error("Another operation is still running")]
    Busy,

    /// A background task failed to complete.
    #[error("Task failed: {message}")]
    Task { message: String },

    /// The store rejected the call.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OpsError {
    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSelection => ErrorKind::NoSelection,
            Self::InvalidSelection { .. } | Self::NotListed { .. } => ErrorKind::InvalidSelection,
            Self::NothingPending => ErrorKind::NothingPending,
            Self::PendingBatchExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::Busy => ErrorKind::Busy,
            Self::Task { .. } => ErrorKind::IoError,
            Self::Store(err) => err.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_keep_their_kind() {
        let err: OpsError = StoreError::NotEmpty { path: "/d".into() }.into();
        assert_eq!(err.kind(), ErrorKind::NotEmpty);
        assert!(err.to_string().contains("/d"));
    }

    #[test]
    fn test_selection_errors() {
        let err = OpsError::InvalidSelection {
            expected: 1,
            actual: 3,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidSelection);
        assert_eq!(err.to_string(), "Select exactly 1 item(s); 3 selected");
        assert_eq!(OpsError::NoSelection.kind(), ErrorKind::NoSelection);
    }
}
