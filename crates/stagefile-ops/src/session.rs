//! The file manager session.

use serde::{Deserialize, Serialize};
use stagefile_core::path;
use stagefile_core::{DirectoryListing, FileStore, SessionConfig, StoreError};
use tokio::sync::mpsc;

use crate::conflict::{Conflict, ConflictPolicy};
use crate::create::{import_file, make_directory};
use crate::delete::{delete_one, delete_path};
use crate::events::{EventSink, SessionEvent};
use crate::lister::list_directory;
use crate::move_op::move_item;
use crate::pending::PendingOperation;
use crate::progress::{OperationComplete, OperationProgress, OperationType};
use crate::rename::{checked_name, rename_target};
use crate::selection::SelectionTracker;
use crate::{OperationError, OperationKind, OpsError};

/// A file exported from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    /// Base name of the exported file.
    pub name: String,
    /// Full content.
    pub data: Vec<u8>,
}

/// All state of one file manager instance.
///
/// The session owns its store, the current directory, the current listing,
/// the selection and the pending batch. Independent sessions share nothing.
///
/// Navigation clears the selection but never touches the pending batch.
/// Every mutating command finishes by re-listing the current directory and
/// sending [`SessionEvent::ListingChanged`].
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    config: SessionConfig,
    current_dir: String,
    listing: DirectoryListing,
    selection: SelectionTracker,
    pending: PendingOperation,
    events: EventSink,
}

impl<S: FileStore> Session<S> {
    /// Open a session in the configured initial directory.
    pub fn new(store: S, config: SessionConfig) -> Result<Self, OpsError> {
        let start = path::normalize(&config.initial_directory);
        let listing = list_directory(&store, &start, &config)?;

        Ok(Self {
            store,
            config,
            current_dir: start,
            listing,
            selection: SelectionTracker::new(),
            pending: PendingOperation::Idle,
            events: EventSink::default(),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the session, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    /// The listing of the current directory as of the last (re)list.
    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn pending(&self) -> &PendingOperation {
        &self.pending
    }

    /// Receive session events. Replaces any earlier subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Enter a directory, given as an absolute path or relative to the
    /// current directory.
    ///
    /// The target must be a directory; on failure nothing changes.
    pub fn navigate(&mut self, input: &str) -> Result<&DirectoryListing, OpsError> {
        let target = path::normalize(&path::resolve(input, &self.current_dir));
        let stat = self.store.stat(&target)?;
        if !self.store.is_directory(stat.mode) {
            return Err(StoreError::NotADirectory { path: target }.into());
        }

        let listing = list_directory(&self.store, &target, &self.config)?;
        tracing::debug!(from = %self.current_dir, to = %target, "navigated");
        self.current_dir = target;
        self.apply_listing(listing);
        Ok(&self.listing)
    }

    /// Go to the parent directory. Does nothing at the root.
    pub fn go_up(&mut self) -> Result<&DirectoryListing, OpsError> {
        if path::is_root(&self.current_dir) {
            return Ok(&self.listing);
        }
        let parent = path::parent(&self.current_dir).to_string();
        self.navigate(&parent)
    }

    /// Re-list the current directory.
    pub fn refresh(&mut self) -> Result<&DirectoryListing, OpsError> {
        let listing = list_directory(&self.store, &self.current_dir, &self.config)?;
        self.apply_listing(listing);
        Ok(&self.listing)
    }

    /// Add or remove a listed path from the selection.
    pub fn toggle_select(&mut self, path: &str, included: bool) -> Result<(), OpsError> {
        if included && !self.listing.contains_path(path) {
            return Err(OpsError::NotListed {
                path: path.to_string(),
            });
        }
        self.selection.toggle(path, included);
        Ok(())
    }

    /// [`toggle_select`](Self::toggle_select) by entry name.
    pub fn select_name(&mut self, name: &str, included: bool) -> Result<(), OpsError> {
        let path = path::join(&self.current_dir, name);
        self.toggle_select(&path, included)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Capture the selection as a pending copy or move.
    ///
    /// Returns the number of pending items.
    pub fn mark(&mut self, kind: OperationKind) -> Result<usize, OpsError> {
        let discarded = self.pending.mark(
            kind,
            &mut self.selection,
            self.config.reject_remark_while_pending,
        )?;
        if let Some(count) = discarded {
            self.events.emit(SessionEvent::PendingDiscarded { count });
        }
        self.events
            .emit(SessionEvent::PendingChanged(self.pending.clone()));
        Ok(self.pending.len())
    }

    /// Execute the pending batch into the current directory.
    pub fn commit_pending(
        &mut self,
        policy: &mut dyn ConflictPolicy,
    ) -> Result<OperationComplete, OpsError> {
        let events = &self.events;
        let report = self.pending.commit(
            &mut self.store,
            &self.current_dir,
            policy,
            &mut |event| events.emit(event),
        )?;
        self.refresh_after_mutation();
        Ok(report)
    }

    /// Rename the single selected item.
    ///
    /// A plain name renames in place. A name containing `/` is a destination
    /// path, resolved against the current directory unless absolute. The
    /// selection survives a failed rename.
    pub fn rename(
        &mut self,
        new_name: &str,
        policy: &mut dyn ConflictPolicy,
    ) -> Result<OperationComplete, OpsError> {
        let source = self
            .selection
            .single()
            .ok_or_else(|| OpsError::InvalidSelection {
                expected: 1,
                actual: self.selection.len(),
            })?
            .to_string();
        let dest = rename_target(&source, new_name, &self.current_dir)?;

        let mut report = OperationComplete::new(OperationType::Rename);
        if dest == source {
            report.record_skip();
            return Ok(report);
        }

        if let Some(conflict) = Conflict::detect(&self.store, &source, &dest) {
            if !policy.should_overwrite(&conflict) {
                tracing::debug!(%source, %dest, "rename declined");
                report.record_skip();
                return Ok(report);
            }
        }

        move_item(&mut self.store, &source, &dest)?;
        tracing::info!(%source, %dest, "renamed");
        report.record_success(0);
        self.refresh_after_mutation();
        Ok(report)
    }

    /// Delete every selected item.
    ///
    /// Directories must be empty. Each item is attempted regardless of
    /// earlier failures; afterwards the selection is cleared.
    pub fn delete(&mut self) -> Result<OperationComplete, OpsError> {
        if self.selection.is_empty() {
            return Err(OpsError::NoSelection);
        }

        let items = self.selection.snapshot();
        let mut report = OperationComplete::new(OperationType::Delete);
        let mut progress = OperationProgress::new(OperationType::Delete, items.len());

        for item in &items {
            progress.set_current_item(Some(item.clone()));
            self.events.emit(SessionEvent::Progress(progress.clone()));

            // The listed kind decides unlink or rmdir; inaccessible entries are files.
            let result = match self.listing.find_path(item) {
                Some(entry) => delete_one(&mut self.store, item, entry.is_dir()),
                None => delete_path(&mut self.store, item),
            };
            match result {
                Ok(()) => report.record_success(0),
                Err(err) => {
                    tracing::warn!(path = %item, error = %err, "delete failed");
                    let error = OperationError::new(item.clone(), err.to_string());
                    report.record_failure(error.clone());
                    self.events.emit(SessionEvent::ItemFailed(error));
                }
            }
            progress.complete_item(0);
        }

        progress.set_current_item(None);
        self.events.emit(SessionEvent::Progress(progress));
        tracing::info!(dir = %self.current_dir, "{}", report.summary());

        self.selection.clear();
        self.refresh_after_mutation();
        Ok(report)
    }

    /// Create a directory in the current directory.
    ///
    /// An existing entry of the same name is an error.
    pub fn mkdir(&mut self, name: &str) -> Result<String, OpsError> {
        let name = checked_name(name)?;
        let target = path::join(&self.current_dir, name);

        make_directory(&mut self.store, &target)?;
        tracing::info!(path = %target, "created directory");
        self.refresh_after_mutation();
        Ok(target)
    }

    /// Write bytes into the current directory under the final segment of
    /// `name`, replacing any existing file.
    pub fn import_bytes(&mut self, name: &str, data: &[u8]) -> Result<String, OpsError> {
        let name = checked_name(path::base_name(name.trim()))?;
        let target = path::join(&self.current_dir, name);

        let bytes = import_file(&mut self.store, &target, data)?;
        tracing::info!(path = %target, bytes, "imported");
        self.refresh_after_mutation();
        Ok(target)
    }

    /// Read the single selected file.
    pub fn export_selected(&self) -> Result<ExportedFile, OpsError> {
        let source = self
            .selection
            .single()
            .ok_or(OpsError::InvalidSelection {
                expected: 1,
                actual: self.selection.len(),
            })?;

        let stat = self.store.stat(source)?;
        if self.store.is_directory(stat.mode) {
            return Err(StoreError::IsADirectory {
                path: source.to_string(),
            }
            .into());
        }

        let data = self.store.read_file(source)?;
        tracing::debug!(path = %source, bytes = data.len(), "exported");
        Ok(ExportedFile {
            name: path::base_name(source).to_string(),
            data,
        })
    }

    fn apply_listing(&mut self, listing: DirectoryListing) {
        self.selection.clear();
        self.listing = listing;
        self.events
            .emit(SessionEvent::ListingChanged(self.listing.clone()));
    }

    fn refresh_after_mutation(&mut self) {
        if let Err(err) = self.refresh() {
            tracing::warn!(dir = %self.current_dir, error = %err, "could not refresh listing");
            self.selection.clear();
        }
    }
}
