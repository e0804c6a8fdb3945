//! Core types and traits for stagefile.
//!
//! This crate provides the fundamental pieces shared by the rest of the
//! stagefile ecosystem: virtual path rules, listing entries, the closed store
//! error set, the [`FileStore`] collaborator trait and session configuration.

mod config;
mod entry;
mod error;
pub mod path;
mod store;

pub use config::{OnConflict, SessionConfig, SessionConfigBuilder};
pub use entry::{compare_names, DirectoryListing, Entry, EntryKind};
pub use error::{ErrorKind, StoreError};
pub use store::{FileStore, StoreStat, DIR_MODE, FILE_MODE, S_IFDIR, S_IFMT, S_IFREG};

/// Shorthand result type for store calls.
pub type StoreResult<T> = Result<T, StoreError>;
