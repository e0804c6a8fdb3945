//! File store backends for stagefile.
//!
//! # Overview
//!
//! `stagefile-store` provides two implementations of
//! [`FileStore`](stagefile_core::FileStore):
//!
//! - [`MemoryStore`] keeps the whole tree in memory. It is what the tests use
//!   and what an embedder reaches for when it already owns the data.
//! - [`LocalStore`] exposes a host directory as a rooted virtual tree. Virtual
//!   paths are normalized before they touch the disk, so nothing outside the
//!   root is reachable.
//!
//! # Example
//!
//! ```rust
//! use stagefile_core::FileStore;
//! use stagefile_store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! store.mkdir("/saves").unwrap();
//! store.write_file("/saves/slot1.srm", b"data").unwrap();
//!
//! assert!(store.is_dir_path("/saves"));
//! assert_eq!(store.read_file("/saves/slot1.srm").unwrap(), b"data");
//! ```

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

// Re-export core types for convenience
pub use stagefile_core::{FileStore, StoreError, StoreResult, StoreStat};
