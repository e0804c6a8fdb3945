//! Error types for store operations.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Errors a [`FileStore`](crate::FileStore) can report.
///
/// This is a closed set: every backend maps its native failures onto one of
/// these variants, and callers match them exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Path not found.
    #[error("No such file or directory: {path}")]
    NotFound { path: String },

    /// Something already exists at the path.
    #[error("Already exists: {path}")]
    AlreadyExists { path: String },

    /// Directory still has children.
    #[error("Directory not empty: {path} (only empty directories can be removed)")]
    NotEmpty { path: String },

    /// A directory was required.
    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    /// A file was required but the path is a directory.
    #[error("Is a directory: {path}")]
    IsADirectory { path: String },

    /// Any other store failure.
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

impl StoreError {
    /// Create a store error from a host I/O error, keeping the virtual path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            std::io::ErrorKind::DirectoryNotEmpty => Self::NotEmpty { path },
            std::io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            std::io::ErrorKind::IsADirectory => Self::IsADirectory { path },
            _ => Self::Io {
                path,
                message: source.to_string(),
            },
        }
    }

    /// Create a catch-all error.
    pub fn other(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::AlreadyExists { path }
            | Self::NotEmpty { path }
            | Self::NotADirectory { path }
            | Self::IsADirectory { path }
            | Self::Io { path, .. } => path,
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotEmpty { .. } => ErrorKind::NotEmpty,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::IsADirectory { .. } => ErrorKind::IsADirectory,
            Self::Io { .. } => ErrorKind::IoError,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an already-exists error.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Classification shared by store and session errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    NotEmpty,
    NotADirectory,
    IsADirectory,
    /// Wrong number of selected items for the action.
    InvalidSelection,
    NoSelection,
    NothingPending,
    InvalidName,
    /// Another mutating command is still running.
    Busy,
    /// Catch-all store failure.
    IoError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_io_mapping() {
        let err = StoreError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.path(), "/test/path");

        let err = StoreError::io(
            "/test/dir",
            std::io::Error::new(std::io::ErrorKind::DirectoryNotEmpty, "busy"),
        );
        assert_eq!(err.kind(), ErrorKind::NotEmpty);

        let err = StoreError::io(
            "/test/file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_not_empty_message_is_distinct() {
        let not_empty = StoreError::NotEmpty { path: "/d".into() };
        let generic = StoreError::other("/d", "disk on fire");
        assert!(not_empty.to_string().contains("not empty"));
        assert!(!generic.to_string().contains("not empty"));
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NothingPending.to_string(), "nothing-pending");
        assert_eq!(ErrorKind::IoError.to_string(), "io-error");
    }
}
