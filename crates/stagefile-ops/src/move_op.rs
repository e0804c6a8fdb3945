//! Move operation.

use stagefile_core::{FileStore, StoreResult};

/// Move `source` to `dest` with a single rename call.
///
/// There is no copy-then-delete fallback: if the store cannot rename across
/// locations, its error is returned as-is.
pub fn move_item<S: FileStore + ?Sized>(store: &mut S, source: &str, dest: &str) -> StoreResult<()> {
    store.rename(source, dest)?;
    tracing::debug!(%source, %dest, "moved");
    Ok(())
}
