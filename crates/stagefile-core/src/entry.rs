//! Directory entry and listing types.

use std::cmp::Ordering;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Classification of a listed child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A directory that can be entered.
    Directory,
    /// A regular file.
    File,
    /// Metadata lookup failed. Still listed, grouped with files.
    Inaccessible,
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    /// Check if the entry could not be inspected.
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, EntryKind::Inaccessible)
    }

    fn group(&self) -> u8 {
        if self.is_dir() { 0 } else { 1 }
    }
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// File/directory name (not full path).
    pub name: CompactString,
    /// Absolute virtual path.
    pub path: String,
    /// What the entry is.
    pub kind: EntryKind,
    /// Size in bytes (0 for directories and inaccessible entries).
    pub size: u64,
}

impl Entry {
    /// Create a directory entry.
    pub fn directory(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<CompactString>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
            size,
        }
    }

    /// Create an entry whose metadata could not be read.
    pub fn inaccessible(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Inaccessible,
            size: 0,
        }
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Order two names the way a human-facing listing expects.
///
/// Names compare case-insensitively first; names differing only in case fall
/// back to a plain comparison so the order stays total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

/// Ordered children of one directory.
///
/// Directories always precede files and inaccessible entries; each group is
/// sorted with [`compare_names`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// The listed directory.
    pub directory: String,
    /// Sorted entries.
    entries: Vec<Entry>,
}

impl DirectoryListing {
    /// Build a listing, sorting the entries.
    pub fn new(directory: impl Into<String>, mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| {
            a.kind
                .group()
                .cmp(&b.kind.group())
                .then_with(|| compare_names(&a.name, &b.name))
        });
        Self {
            directory: directory.into(),
            entries,
        }
    }

    /// Entries in display order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate over entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by name.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Find an entry by full path.
    pub fn find_path(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Check if a path is one of the listed entries.
    pub fn contains_path(&self, path: &str) -> bool {
        self.find_path(path).is_some()
    }

    /// Directory entries only.
    pub fn directories(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_dir())
    }

    /// File and inaccessible entries.
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_dir())
    }
}

impl<'a> IntoIterator for &'a DirectoryListing {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
