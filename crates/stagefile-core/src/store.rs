//! The file store collaborator.

use serde::{Deserialize, Serialize};

use crate::StoreResult;

/// Mask selecting the file type bits of a mode.
pub const S_IFMT: u32 = 0o170000;
/// Directory type bits.
pub const S_IFDIR: u32 = 0o040000;
/// Regular file type bits.
pub const S_IFREG: u32 = 0o100000;

/// Mode reported for directories by stores without real permissions.
pub const DIR_MODE: u32 = S_IFDIR | 0o755;
/// Mode reported for regular files by stores without real permissions.
pub const FILE_MODE: u32 = S_IFREG | 0o644;

/// Metadata returned by [`FileStore::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStat {
    /// POSIX-style mode bits.
    pub mode: u32,
    /// Size in bytes (0 for directories).
    pub size: u64,
}

impl StoreStat {
    /// Stat for a directory.
    pub fn directory() -> Self {
        Self {
            mode: DIR_MODE,
            size: 0,
        }
    }

    /// Stat for a regular file of the given size.
    pub fn file(size: u64) -> Self {
        Self {
            mode: FILE_MODE,
            size,
        }
    }
}

/// A hierarchical, mutable store addressed by absolute virtual paths.
///
/// Implementations own the data entirely; stagefile only ever reaches it
/// through these calls. Every call either completes or fails with a
/// [`StoreError`](crate::StoreError) before returning.
pub trait FileStore {
    /// Metadata for a path.
    fn stat(&self, path: &str) -> StoreResult<StoreStat>;

    /// Whether a mode describes a directory.
    fn is_directory(&self, mode: u32) -> bool {
        mode & S_IFMT == S_IFDIR
    }

    /// Names of a directory's children. May include `.` and `..`.
    fn readdir(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Create a single directory. Fails with `AlreadyExists` if present.
    fn mkdir(&mut self, path: &str) -> StoreResult<()>;

    /// Atomically rename `src` to `dest`.
    fn rename(&mut self, src: &str, dest: &str) -> StoreResult<()>;

    /// Remove a file.
    fn unlink(&mut self, path: &str) -> StoreResult<()>;

    /// Remove an empty directory.
    fn rmdir(&mut self, path: &str) -> StoreResult<()>;

    /// Read a whole file.
    fn read_file(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Write a whole file, replacing any previous content.
    fn write_file(&mut self, path: &str, data: &[u8]) -> StoreResult<()>;

    /// Whether anything exists at the path.
    fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }

    /// Whether the path exists and is a directory.
    fn is_dir_path(&self, path: &str) -> bool {
        self.stat(path)
            .map(|stat| self.is_directory(stat.mode))
            .unwrap_or(false)
    }
}

impl<S: FileStore + ?Sized> FileStore for Box<S> {
    fn stat(&self, path: &str) -> StoreResult<StoreStat> {
        (**self).stat(path)
    }

    fn is_directory(&self, mode: u32) -> bool {
        (**self).is_directory(mode)
    }

    fn readdir(&self, path: &str) -> StoreResult<Vec<String>> {
        (**self).readdir(path)
    }

    fn mkdir(&mut self, path: &str) -> StoreResult<()> {
        (**self).mkdir(path)
    }

    fn rename(&mut self, src: &str, dest: &str) -> StoreResult<()> {
        (**self).rename(src, dest)
    }

    fn unlink(&mut self, path: &str) -> StoreResult<()> {
        (**self).unlink(path)
    }

    fn rmdir(&mut self, path: &str) -> StoreResult<()> {
        (**self).rmdir(path)
    }

    fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        (**self).read_file(path)
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> StoreResult<()> {
        (**self).write_file(path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_bits() {
        assert_eq!(DIR_MODE & S_IFMT, S_IFDIR);
        assert_eq!(FILE_MODE & S_IFMT, S_IFREG);
        assert_eq!(StoreStat::file(12).size, 12);
        assert_eq!(StoreStat::directory().mode, DIR_MODE);
    }
}
