//! Directory creation and file import.

use stagefile_core::{FileStore, StoreResult};

/// Create a directory. Fails with `AlreadyExists` if anything is already there.
pub fn make_directory<S: FileStore + ?Sized>(store: &mut S, path: &str) -> StoreResult<()> {
    store.mkdir(path)?;
    tracing::debug!(%path, "created directory");
    Ok(())
}

/// Write imported bytes to `path`, silently replacing an existing file.
pub fn import_file<S: FileStore + ?Sized>(store: &mut S, path: &str, data: &[u8]) -> StoreResult<u64> {
    store.write_file(path, data)?;
    tracing::debug!(%path, bytes = data.len(), "imported file");
    Ok(data.len() as u64)
}
