//! Multi-item selection.

use indexmap::IndexSet;

/// The set of paths currently checked by the user, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    paths: IndexSet<String>,
}

impl SelectionTracker {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove a path. Repeating the same call has no further effect.
    pub fn toggle(&mut self, path: &str, included: bool) {
        if included {
            self.paths.insert(path.to_string());
        } else {
            self.paths.shift_remove(path);
        }
    }

    /// Drop every selected path.
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Selected paths in the order they were added.
    pub fn snapshot(&self) -> Vec<String> {
        self.paths.iter().cloned().collect()
    }

    /// Check if a path is selected.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Number of selected paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The only selected path, if exactly one is selected.
    pub fn single(&self) -> Option<&str> {
        match self.paths.len() {
            1 => self.paths.first().map(String::as_str),
            _ => None,
        }
    }

    /// Iterate over selected paths in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_idempotent() {
        let mut selection = SelectionTracker::new();
        selection.toggle("/a", true);
        selection.toggle("/a", true);
        assert_eq!(selection.len(), 1);

        selection.toggle("/a", false);
        selection.toggle("/a", false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_snapshot_keeps_insertion_order() {
        let mut selection = SelectionTracker::new();
        selection.toggle("/c", true);
        selection.toggle("/a", true);
        selection.toggle("/b", true);
        selection.toggle("/a", false);
        selection.toggle("/a", true);

        assert_eq!(selection.snapshot(), vec!["/c", "/b", "/a"]);
    }

    #[test]
    fn test_single() {
        let mut selection = SelectionTracker::new();
        assert_eq!(selection.single(), None);
        selection.toggle("/only", true);
        assert_eq!(selection.single(), Some("/only"));
        selection.toggle("/other", true);
        assert_eq!(selection.single(), None);

        selection.clear();
        assert!(selection.is_empty());
    }
}
