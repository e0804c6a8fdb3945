//! Notifications sent from a session to its presentation layer.

use stagefile_core::DirectoryListing;
use tokio::sync::mpsc;

use crate::pending::PendingOperation;
use crate::progress::OperationProgress;
use crate::OperationError;

/// Something the presentation layer may want to redraw.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The current directory was (re)listed.
    ListingChanged(DirectoryListing),
    /// A batch advanced by one item.
    Progress(OperationProgress),
    /// One item of a batch failed; the batch continues.
    ItemFailed(OperationError),
    /// One item of a batch was skipped.
    ItemSkipped { path: String, reason: String },
    /// The pending batch was marked, committed or cleared.
    PendingChanged(PendingOperation),
    /// An uncommitted batch was replaced by a new mark.
    PendingDiscarded { count: usize },
}

/// Sending half of the event channel. Sends never block and are dropped when
/// nobody listens.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventSink {
    /// Replace the subscriber and return the new receiver.
    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.tx = Some(tx);
        rx
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
