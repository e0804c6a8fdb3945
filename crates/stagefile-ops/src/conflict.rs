//! Conflict detection and resolution for file operations.

use serde::{Deserialize, Serialize};
use stagefile_core::path;
use stagefile_core::{FileStore, OnConflict};

/// A conflict detected before an operation would overwrite a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The source path being operated on.
    pub source: String,
    /// The destination path where the conflict exists.
    pub destination: String,
    /// The kind of conflict.
    pub kind: ConflictKind,
}

impl Conflict {
    /// Create a new conflict.
    pub fn new(source: impl Into<String>, destination: impl Into<String>, kind: ConflictKind) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind,
        }
    }

    /// Look up `destination` and describe the conflict, if any.
    pub fn detect<S: FileStore + ?Sized>(store: &S, source: &str, destination: &str) -> Option<Self> {
        let stat = store.stat(destination).ok()?;
        let kind = if store.is_directory(stat.mode) {
            ConflictKind::DirectoryExists
        } else {
            ConflictKind::FileExists
        };
        Some(Self::new(source, destination, kind))
    }

    /// Name of the destination as shown to the user.
    pub fn destination_name(&self) -> &str {
        path::base_name(&self.destination)
    }
}

/// The kind of conflict encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// A file already exists at the destination.
    FileExists,
    /// A directory already exists at the destination.
    DirectoryExists,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileExists => write!(f, "File already exists"),
            Self::DirectoryExists => write!(f, "Directory already exists"),
        }
    }
}

/// Decides whether an existing destination may be overwritten.
///
/// Asked once per conflicting item. Declining skips that item only; the rest
/// of the batch still runs.
pub trait ConflictPolicy {
    /// Return `true` to overwrite, `false` to skip the item.
    fn should_overwrite(&mut self, conflict: &Conflict) -> bool;
}

impl<F> ConflictPolicy for F
where
    F: FnMut(&Conflict) -> bool,
{
    fn should_overwrite(&mut self, conflict: &Conflict) -> bool {
        self(conflict)
    }
}

/// Policy that overwrites every conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl ConflictPolicy for AlwaysOverwrite {
    fn should_overwrite(&mut self, _conflict: &Conflict) -> bool {
        true
    }
}

/// Policy that skips every conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl ConflictPolicy for NeverOverwrite {
    fn should_overwrite(&mut self, _conflict: &Conflict) -> bool {
        false
    }
}

/// Policy for a non-interactive setting.
///
/// Returns `None` for [`OnConflict::Ask`]; the caller has to supply a policy
/// that can ask.
pub fn fixed_policy(on_conflict: OnConflict) -> Option<Box<dyn ConflictPolicy + Send>> {
    match on_conflict {
        OnConflict::Ask => None,
        OnConflict::Overwrite => Some(Box::new(AlwaysOverwrite)),
        OnConflict::Skip => Some(Box::new(NeverOverwrite)),
    }
}
