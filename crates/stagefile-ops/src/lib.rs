//! File manager engine for stagefile.
//!
//! A [`Session`] keeps the current directory, its listing, a selection and a
//! deferred copy/move batch over any [`FileStore`]. Batches are marked in one
//! directory and committed into whichever directory is current later.
//! [`SessionHandle`] runs commands off the async runtime and refuses
//! overlapping mutations.

mod conflict;
mod copy;
mod create;
mod delete;
mod error;
mod events;
mod executor;
mod lister;
mod move_op;
mod operation;
mod pending;
mod progress;
mod rename;
mod selection;
mod session;

pub use conflict::{fixed_policy, AlwaysOverwrite, Conflict, ConflictKind, ConflictPolicy, NeverOverwrite};
pub use copy::copy_recursive;
pub use create::{import_file, make_directory};
pub use delete::{delete_one, delete_path};
pub use error::OpsError;
pub use events::SessionEvent;
pub use executor::SessionHandle;
pub use lister::list_directory;
pub use move_op::move_item;
pub use operation::{OperationError, OperationKind};
pub use pending::PendingOperation;
pub use progress::{OperationComplete, OperationProgress, OperationType};
pub use rename::{checked_name, rename_target, validate_filename, MAX_NAME_LEN};
pub use selection::SelectionTracker;
pub use session::{ExportedFile, Session};

pub use stagefile_core::{
    DirectoryListing, Entry, EntryKind, ErrorKind, FileStore, OnConflict, SessionConfig, StoreError,
};
