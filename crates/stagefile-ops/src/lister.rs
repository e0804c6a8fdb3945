//! Directory listing.

use stagefile_core::path;
use stagefile_core::{DirectoryListing, Entry, FileStore, SessionConfig, StoreResult};

/// List the immediate children of `dir`.
///
/// Fails only when `dir` itself cannot be read. A child whose `stat` fails is
/// still listed, as an inaccessible file, so one bad entry never hides the
/// rest of the directory.
pub fn list_directory<S: FileStore + ?Sized>(
    store: &S,
    dir: &str,
    config: &SessionConfig,
) -> StoreResult<DirectoryListing> {
    let names = store.readdir(dir)?;
    let mut entries = Vec::with_capacity(names.len());

    for name in names {
        if name == "." || name == ".." || config.should_skip_hidden(&name) {
            continue;
        }

        let child = path::join(dir, &name);
        match store.stat(&child) {
            Ok(stat) if store.is_directory(stat.mode) => {
                entries.push(Entry::directory(name, child));
            }
            Ok(stat) => entries.push(Entry::file(name, child, stat.size)),
            Err(err) => {
                tracing::warn!(path = %child, error = %err, "could not stat entry");
                entries.push(Entry::inaccessible(name, child));
            }
        }
    }

    Ok(DirectoryListing::new(dir, entries))
}
