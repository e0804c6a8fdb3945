//! Delete operation.

use stagefile_core::{FileStore, StoreResult};

/// Delete one path.
///
/// Directories are removed only when empty; a populated directory fails with
/// `NotEmpty` and is left untouched. There is no recursive delete.
pub fn delete_one<S: FileStore + ?Sized>(store: &mut S, path: &str, is_directory: bool) -> StoreResult<()> {
    if is_directory {
        store.rmdir(path)?;
    } else {
        store.unlink(path)?;
    }
    tracing::debug!(%path, is_directory, "deleted");
    Ok(())
}

/// Stat `path` and delete it as a file or an empty directory.
pub fn delete_path<S: FileStore + ?Sized>(store: &mut S, path: &str) -> StoreResult<()> {
    let stat = store.stat(path)?;
    let is_directory = store.is_directory(stat.mode);
    delete_one(store, path, is_directory)
}
