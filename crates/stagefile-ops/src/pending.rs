//! Deferred copy/move batches.
//!
//! A batch is marked from the current selection, survives any amount of
//! navigation, and is committed against whatever directory is current at
//! commit time. Only one batch exists at a time.

use serde::{Deserialize, Serialize};
use stagefile_core::path;
use stagefile_core::FileStore;

use crate::conflict::{Conflict, ConflictPolicy};
use crate::copy::copy_recursive;
use crate::events::SessionEvent;
use crate::move_op::move_item;
use crate::progress::{OperationComplete, OperationProgress, OperationType};
use crate::selection::SelectionTracker;
use crate::{OperationError, OperationKind, OpsError};

/// State of the deferred operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingOperation {
    /// Nothing marked.
    #[default]
    Idle,
    /// Items waiting to be copied.
    CopyPending(Vec<String>),
    /// Items waiting to be moved.
    MovePending(Vec<String>),
}

enum ItemOutcome {
    Done(u64),
    Skipped(String),
}

impl PendingOperation {
    /// Create a pending batch of the given kind.
    pub fn marked(kind: OperationKind, items: Vec<String>) -> Self {
        match kind {
            OperationKind::Copy => Self::CopyPending(items),
            OperationKind::Move => Self::MovePending(items),
        }
    }

    /// The kind of the pending batch, if any.
    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            Self::Idle => None,
            Self::CopyPending(_) => Some(OperationKind::Copy),
            Self::MovePending(_) => Some(OperationKind::Move),
        }
    }

    /// Paths captured when the batch was marked.
    pub fn items(&self) -> &[String] {
        match self {
            Self::Idle => &[],
            Self::CopyPending(items) | Self::MovePending(items) => items,
        }
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Check if nothing is pending.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Reset to idle, returning the batch that was pending.
    pub fn take(&mut self) -> Option<(OperationKind, Vec<String>)> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::CopyPending(items) => Some((OperationKind::Copy, items)),
            Self::MovePending(items) => Some((OperationKind::Move, items)),
        }
    }

    /// Capture the selection as a new pending batch and clear the selection.
    ///
    /// An uncommitted batch is replaced unless `reject_if_pending` is set.
    /// Returns the size of the replaced batch, if there was one.
    pub fn mark(
        &mut self,
        kind: OperationKind,
        selection: &mut SelectionTracker,
        reject_if_pending: bool,
    ) -> Result<Option<usize>, OpsError> {
        if selection.is_empty() {
            return Err(OpsError::NoSelection);
        }
        if reject_if_pending && !self.is_idle() {
            return Err(OpsError::PendingBatchExists { count: self.len() });
        }

        let discarded = (!self.is_idle()).then(|| self.len());
        if let Some(count) = discarded {
            tracing::warn!(count, "discarding uncommitted batch");
        }

        *self = Self::marked(kind, selection.snapshot());
        selection.clear();
        tracing::info!(%kind, items = self.len(), "marked batch");
        Ok(discarded)
    }

    /// Run the pending batch against `current_dir` and reset to idle.
    ///
    /// Each item lands at `current_dir/<base name>`. Items whose destination
    /// equals their source are skipped, conflicting destinations go through
    /// `policy`, and a failing item is reported without stopping the rest.
    /// The state is idle afterwards no matter how many items failed.
    pub fn commit<S: FileStore + ?Sized>(
        &mut self,
        store: &mut S,
        current_dir: &str,
        policy: &mut dyn ConflictPolicy,
        on_event: &mut dyn FnMut(SessionEvent),
    ) -> Result<OperationComplete, OpsError> {
        let (kind, items) = self.take().ok_or(OpsError::NothingPending)?;
        on_event(SessionEvent::PendingChanged(Self::Idle));

        let operation_type = match kind {
            OperationKind::Copy => OperationType::Copy,
            OperationKind::Move => OperationType::Move,
        };
        let mut report = OperationComplete::new(operation_type);
        let mut progress = OperationProgress::new(operation_type, items.len());

        for source in &items {
            progress.set_current_item(Some(source.clone()));
            on_event(SessionEvent::Progress(progress.clone()));

            let bytes = match commit_item(store, kind, source, current_dir, policy) {
                Ok(ItemOutcome::Done(bytes)) => {
                    report.record_success(bytes);
                    bytes
                }
                Ok(ItemOutcome::Skipped(reason)) => {
                    tracing::debug!(%source, %reason, "skipped");
                    report.record_skip();
                    on_event(SessionEvent::ItemSkipped {
                        path: source.clone(),
                        reason,
                    });
                    0
                }
                Err(message) => {
                    tracing::warn!(%source, %message, "{kind} failed");
                    let error = OperationError::new(source.clone(), message);
                    report.record_failure(error.clone());
                    on_event(SessionEvent::ItemFailed(error));
                    0
                }
            };
            progress.complete_item(bytes);
        }

        progress.set_current_item(None);
        on_event(SessionEvent::Progress(progress));
        tracing::info!(target_dir = %current_dir, "{}", report.summary());
        Ok(report)
    }
}

fn commit_item<S: FileStore + ?Sized>(
    store: &mut S,
    kind: OperationKind,
    source: &str,
    current_dir: &str,
    policy: &mut dyn ConflictPolicy,
) -> Result<ItemOutcome, String> {
    let dest = path::join(current_dir, path::base_name(source));

    if dest == source {
        return Ok(ItemOutcome::Skipped(
            "source and destination are the same".into(),
        ));
    }
    if path::is_within(&dest, source) {
        return Err("Cannot copy/move a directory into itself".into());
    }

    if let Some(conflict) = Conflict::detect(&*store, source, &dest) {
        if !policy.should_overwrite(&conflict) {
            return Ok(ItemOutcome::Skipped(format!(
                "{}: overwrite declined",
                conflict.kind
            )));
        }
    }

    match kind {
        OperationKind::Copy => copy_recursive(store, source, &dest)
            .map(ItemOutcome::Done)
            .map_err(|e| e.to_string()),
        OperationKind::Move => move_item(store, source, &dest)
            .map(|()| ItemOutcome::Done(0))
            .map_err(|e| e.to_string()),
    }
}
