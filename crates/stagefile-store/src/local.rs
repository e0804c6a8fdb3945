//! Host directory exposed as a rooted virtual tree.

use std::fs;
use std::path::{Path, PathBuf};

use stagefile_core::path;
use stagefile_core::{FileStore, StoreError, StoreResult, StoreStat};

/// A file store backed by a directory on the host.
///
/// The virtual root `/` maps to `root`. Virtual paths are normalized before
/// use, so `..` segments can never climb out of it.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at an existing host directory.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let metadata = fs::metadata(&root).map_err(|e| StoreError::io(path::ROOT, e))?;
        if !metadata.is_dir() {
            return Err(StoreError::NotADirectory {
                path: root.display().to_string(),
            });
        }
        tracing::debug!(root = %root.display(), "opened local store");
        Ok(Self { root })
    }

    /// The host directory backing the virtual root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a virtual path onto the host.
    pub fn host_path(&self, virtual_path: &str) -> PathBuf {
        let normalized = path::normalize(virtual_path);
        let relative = normalized.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    if metadata.is_dir() {
        stagefile_core::DIR_MODE
    } else {
        stagefile_core::FILE_MODE
    }
}

impl FileStore for LocalStore {
    fn stat(&self, path: &str) -> StoreResult<StoreStat> {
        let metadata = fs::metadata(self.host_path(path)).map_err(|e| StoreError::io(path, e))?;
        Ok(StoreStat {
            mode: mode_of(&metadata),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
        })
    }

    fn readdir(&self, path: &str) -> StoreResult<Vec<String>> {
        let host = self.host_path(path);
        let entries = fs::read_dir(&host).map_err(|e| StoreError::io(path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(path, e))?;
            let file_name = entry.file_name();
            let name = match file_name.to_str() {
                Some(name) => name.to_string(),
                None => {
                    let lossy = file_name.to_string_lossy().into_owned();
                    tracing::warn!(dir = %path, name = %lossy, "name is not valid UTF-8");
                    lossy
                }
            };
            names.push(name);
        }
        Ok(names)
    }

    fn mkdir(&mut self, path: &str) -> StoreResult<()> {
        fs::create_dir(self.host_path(path)).map_err(|e| StoreError::io(path, e))
    }

    fn rename(&mut self, src: &str, dest: &str) -> StoreResult<()> {
        if path::is_root(&path::normalize(src)) {
            return Err(StoreError::other(src, "cannot rename the root"));
        }
        fs::rename(self.host_path(src), self.host_path(dest)).map_err(|e| StoreError::io(src, e))
    }

    fn unlink(&mut self, path: &str) -> StoreResult<()> {
        let host = self.host_path(path);
        let metadata = fs::symlink_metadata(&host).map_err(|e| StoreError::io(path, e))?;
        if metadata.is_dir() {
            return Err(StoreError::IsADirectory {
                path: path.to_string(),
            });
        }
        fs::remove_file(host).map_err(|e| StoreError::io(path, e))
    }

    fn rmdir(&mut self, path: &str) -> StoreResult<()> {
        if path::is_root(&path::normalize(path)) {
            return Err(StoreError::other(path, "cannot remove the root"));
        }
        let host = self.host_path(path);
        let metadata = fs::symlink_metadata(&host).map_err(|e| StoreError::io(path, e))?;
        // `stat` follows links, so a link to a directory is listed as one.
        if metadata.file_type().is_symlink() && host.is_dir() {
            return fs::remove_file(host).map_err(|e| StoreError::io(path, e));
        }
        if !metadata.is_dir() {
            return Err(StoreError::NotADirectory {
                path: path.to_string(),
            });
        }
        fs::remove_dir(host).map_err(|e| StoreError::io(path, e))
    }

    fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        fs::read(self.host_path(path)).map_err(|e| StoreError::io(path, e))
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> StoreResult<()> {
        fs::write(self.host_path(path), data).map_err(|e| StoreError::io(path, e))
    }
}
