//! In-memory file store.

use std::collections::{BTreeMap, BTreeSet};

use stagefile_core::path::{self, ROOT};
use stagefile_core::{FileStore, StoreError, StoreResult, StoreStat};

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
}

/// A file store that keeps the whole tree in memory.
///
/// Semantics follow a POSIX-like in-memory filesystem: `readdir` reports `.`
/// and `..`, `rename` replaces an existing file or empty directory of the
/// same type, and `rmdir` refuses non-empty directories.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    nodes: BTreeMap<String, Node>,
    unreadable: BTreeSet<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT.to_string(), Node::Directory);
        Self {
            nodes,
            unreadable: BTreeSet::new(),
        }
    }

    /// Builder form of [`create_dir_all`](Self::create_dir_all).
    pub fn with_dir(mut self, path: &str) -> Self {
        self.create_dir_all(path);
        self
    }

    /// Builder form of [`insert_file`](Self::insert_file).
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert_file(path, data);
        self
    }

    /// Create a directory and any missing ancestors.
    pub fn create_dir_all(&mut self, path: &str) {
        let path = path::normalize(path);
        let mut current = ROOT.to_string();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = path::join(&current, segment);
            self.nodes.entry(current.clone()).or_insert(Node::Directory);
        }
    }

    /// Insert a file, creating missing ancestors.
    pub fn insert_file(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        let path = path::normalize(path);
        self.create_dir_all(path::parent(&path));
        self.nodes.insert(path, Node::File(data.into()));
    }

    /// Make `stat`, `readdir` and `read_file` fail for a path.
    pub fn mark_unreadable(&mut self, path: &str) {
        self.unreadable.insert(path::normalize(path));
    }

    /// Every path in the store, root included, in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    fn child_prefix(dir: &str) -> String {
        if path::is_root(dir) {
            ROOT.to_string()
        } else {
            format!("{dir}/")
        }
    }

    fn descendants(&self, dir: &str) -> Vec<String> {
        let prefix = Self::child_prefix(dir);
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| key.len() > prefix.len())
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn child_names(&self, dir: &str) -> Vec<String> {
        let prefix = Self::child_prefix(dir);
        self.descendants(dir)
            .into_iter()
            .filter_map(|key| {
                let rest = &key[prefix.len()..];
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect()
    }

    fn node(&self, path: &str) -> StoreResult<&Node> {
        self.nodes.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })
    }

    fn check_readable(&self, path: &str) -> StoreResult<()> {
        if self.unreadable.contains(path) {
            return Err(StoreError::other(path, "permission denied"));
        }
        Ok(())
    }

    fn require_parent_dir(&self, path: &str) -> StoreResult<()> {
        let parent = path::parent(path);
        match self.nodes.get(parent) {
            Some(Node::Directory) => Ok(()),
            Some(Node::File(_)) => Err(StoreError::NotADirectory {
                path: parent.to_string(),
            }),
            None => Err(StoreError::NotFound {
                path: parent.to_string(),
            }),
        }
    }
}

impl FileStore for MemoryStore {
    fn stat(&self, path: &str) -> StoreResult<StoreStat> {
        let path = path::normalize(path);
        self.check_readable(&path)?;
        Ok(match self.node(&path)? {
            Node::Directory => StoreStat::directory(),
            Node::File(data) => StoreStat::file(data.len() as u64),
        })
    }

    fn readdir(&self, path: &str) -> StoreResult<Vec<String>> {
        let path = path::normalize(path);
        self.check_readable(&path)?;
        match self.node(&path)? {
            Node::File(_) => Err(StoreError::NotADirectory { path }),
            Node::Directory => {
                let mut names = vec![".".to_string(), "..".to_string()];
                names.extend(self.child_names(&path));
                Ok(names)
            }
        }
    }

    fn mkdir(&mut self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path);
        if self.nodes.contains_key(&path) {
            return Err(StoreError::AlreadyExists { path });
        }
        self.require_parent_dir(&path)?;
        self.nodes.insert(path, Node::Directory);
        Ok(())
    }

    fn rename(&mut self, src: &str, dest: &str) -> StoreResult<()> {
        let src = path::normalize(src);
        let dest = path::normalize(dest);

        let src_is_dir = matches!(self.node(&src)?, Node::Directory);
        if src == dest {
            return Ok(());
        }
        if path::is_root(&src) {
            return Err(StoreError::other(src, "cannot rename the root"));
        }
        if src_is_dir && path::is_within(&dest, &src) {
            return Err(StoreError::other(
                dest,
                "cannot move a directory into itself",
            ));
        }
        self.require_parent_dir(&dest)?;

        let existing_is_dir = self
            .nodes
            .get(&dest)
            .map(|node| matches!(node, Node::Directory));
        match (src_is_dir, existing_is_dir) {
            (true, Some(false)) => return Err(StoreError::NotADirectory { path: dest }),
            (false, Some(true)) => return Err(StoreError::IsADirectory { path: dest }),
            (true, Some(true)) if !self.child_names(&dest).is_empty() => {
                return Err(StoreError::NotEmpty { path: dest });
            }
            _ => {}
        }
        self.nodes.remove(&dest);

        let mut moved = vec![src.clone()];
        moved.extend(self.descendants(&src));
        for old in moved {
            if let Some(node) = self.nodes.remove(&old) {
                let new = format!("{dest}{}", &old[src.len()..]);
                self.nodes.insert(new, node);
            }
        }

        Ok(())
    }

    fn unlink(&mut self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path);
        match self.node(&path)? {
            Node::Directory => Err(StoreError::IsADirectory { path }),
            Node::File(_) => {
                self.nodes.remove(&path);
                Ok(())
            }
        }
    }

    fn rmdir(&mut self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path);
        if path::is_root(&path) {
            return Err(StoreError::other(path, "cannot remove the root"));
        }
        match self.node(&path)? {
            Node::File(_) => Err(StoreError::NotADirectory { path }),
            Node::Directory => {
                if !self.child_names(&path).is_empty() {
                    return Err(StoreError::NotEmpty { path });
                }
                self.nodes.remove(&path);
                Ok(())
            }
        }
    }

    fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        let path = path::normalize(path);
        self.check_readable(&path)?;
        match self.node(&path)? {
            Node::Directory => Err(StoreError::IsADirectory { path }),
            Node::File(data) => Ok(data.clone()),
        }
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> StoreResult<()> {
        let path = path::normalize(path);
        if let Some(Node::Directory) = self.nodes.get(&path) {
            return Err(StoreError::IsADirectory { path });
        }
        self.require_parent_dir(&path)?;
        self.nodes.insert(path, Node::File(data.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryStore {
        MemoryStore::new()
            .with_file("/a/x.txt", "hello")
            .with_dir("/a/b")
            .with_file("/a/c/deep.bin", vec![0u8, 1, 2])
    }

    #[test]
    fn test_readdir_includes_pseudo_entries() {
        let store = sample();
        let names = store.readdir("/a").unwrap();
        assert_eq!(names, vec![".", "..", "b", "c", "x.txt"]);
    }

    #[test]
    fn test_readdir_on_file_fails() {
        let store = sample();
        assert!(matches!(
            store.readdir("/a/x.txt"),
            Err(StoreError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_mkdir_existing_fails() {
        let mut store = sample();
        assert!(store.mkdir("/a/b").unwrap_err().is_already_exists());
        assert!(matches!(
            store.mkdir("/missing/child"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_rename_moves_subtree() {
        let mut store = sample();
        store.rename("/a/c", "/a/b/c").unwrap();
        assert!(!store.exists("/a/c"));
        assert_eq!(store.read_file("/a/b/c/deep.bin").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_rename_into_own_subtree_fails() {
        let mut store = sample();
        assert!(store.rename("/a", "/a/b/a").is_err());
        assert!(store.exists("/a/x.txt"));
    }

    #[test]
    fn test_rename_replaces_file() {
        let mut store = sample().with_file("/a/y.txt", "old");
        store.rename("/a/x.txt", "/a/y.txt").unwrap();
        assert_eq!(store.read_file("/a/y.txt").unwrap(), b"hello");
        assert!(!store.exists("/a/x.txt"));
    }

    #[test]
    fn test_rename_file_onto_directory_fails() {
        let mut store = sample();
        assert!(matches!(
            store.rename("/a/x.txt", "/a/b"),
            Err(StoreError::IsADirectory { .. })
        ));
    }

    #[test]
    fn test_rmdir_non_empty_fails() {
        let mut store = sample();
        assert!(matches!(store.rmdir("/a"), Err(StoreError::NotEmpty { .. })));
        store.rmdir("/a/b").unwrap();
        assert!(!store.exists("/a/b"));
    }

    #[test]
    fn test_unlink_directory_fails() {
        let mut store = sample();
        assert!(matches!(
            store.unlink("/a/b"),
            Err(StoreError::IsADirectory { .. })
        ));
        store.unlink("/a/x.txt").unwrap();
        assert!(!store.exists("/a/x.txt"));
    }

    #[test]
    fn test_write_file_overwrites() {
        let mut store = sample();
        store.write_file("/a/x.txt", b"bye").unwrap();
        assert_eq!(store.read_file("/a/x.txt").unwrap(), b"bye");
        assert_eq!(store.stat("/a/x.txt").unwrap().size, 3);
    }

    #[test]
    fn test_unreadable_paths() {
        let mut store = sample();
        store.mark_unreadable("/a/x.txt");
        assert!(store.stat("/a/x.txt").is_err());
        assert!(store.read_file("/a/x.txt").is_err());
        assert!(store.readdir("/a").is_ok());
    }
}
