//! Recursive copy.

use stagefile_core::path;
use stagefile_core::{FileStore, StoreResult};

/// Copy `source` to `dest`, recursing into directories.
///
/// Directories are created with an idempotent mkdir, so copying onto an
/// existing directory merges into it. Files are read whole and written whole,
/// replacing any existing file. The first failure aborts the copy and leaves
/// whatever was already written in place.
///
/// Returns the number of file bytes written.
pub fn copy_recursive<S: FileStore + ?Sized>(store: &mut S, source: &str, dest: &str) -> StoreResult<u64> {
    let stat = store.stat(source)?;

    if store.is_directory(stat.mode) {
        copy_dir_recursive(store, source, dest)
    } else {
        copy_file(store, source, dest)
    }
}

/// Copy a single file.
fn copy_file<S: FileStore + ?Sized>(store: &mut S, source: &str, dest: &str) -> StoreResult<u64> {
    let data = store.read_file(source)?;
    store.write_file(dest, &data)?;
    tracing::debug!(%source, %dest, bytes = data.len(), "copied file");
    Ok(data.len() as u64)
}

/// Recursively copy a directory.
fn copy_dir_recursive<S: FileStore + ?Sized>(
    store: &mut S,
    source: &str,
    dest: &str,
) -> StoreResult<u64> {
    match store.mkdir(dest) {
        Ok(()) => {}
        Err(err) if err.is_already_exists() => {}
        Err(err) => return Err(err),
    }

    let mut total_bytes = 0u64;
    for name in store.readdir(source)? {
        if name == "." || name == ".." {
            continue;
        }
        total_bytes += copy_recursive(store, &path::join(source, &name), &path::join(dest, &name))?;
    }

    Ok(total_bytes)
}
