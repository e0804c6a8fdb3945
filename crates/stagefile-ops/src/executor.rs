//! Async front end for a [`Session`].
//!
//! Each command runs on the blocking pool while a busy flag is held. A second
//! mutating command that arrives before the first finishes is refused with
//! [`OpsError::Busy`] instead of queueing behind it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use stagefile_core::{DirectoryListing, FileStore};
use tokio::sync::mpsc;

use crate::conflict::ConflictPolicy;
use crate::events::SessionEvent;
use crate::progress::OperationComplete;
use crate::session::{ExportedFile, Session};
use crate::{OperationKind, OpsError};

/// Shared, cloneable handle to one session.
#[derive(Debug)]
pub struct SessionHandle<S> {
    session: Arc<Mutex<Session<S>>>,
    busy: Arc<AtomicBool>,
    yield_first: bool,
}

impl<S> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            busy: Arc::clone(&self.busy),
            yield_first: self.yield_first,
        }
    }
}

/// Clears the busy flag when dropped.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: FileStore + Send + 'static> SessionHandle<S> {
    /// Wrap a session.
    pub fn new(session: Session<S>) -> Self {
        let yield_first = session.config().yield_before_commit;
        Self {
            session: Arc::new(Mutex::new(session)),
            busy: Arc::new(AtomicBool::new(false)),
            yield_first,
        }
    }

    /// Check if a command is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<BusyGuard, OpsError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OpsError::Busy)?;
        Ok(BusyGuard(Arc::clone(&self.busy)))
    }

    /// Run `f` against the session on the blocking pool.
    ///
    /// Fails with [`OpsError::Busy`] if another command is still running.
    pub async fn run<T, F>(&self, f: F) -> Result<T, OpsError>
    where
        F: FnOnce(&mut Session<S>) -> Result<T, OpsError> + Send + 'static,
        T: Send + 'static,
    {
        let _guard = self.acquire()?;

        // Let the caller render its "working" state before the store is hit.
        if self.yield_first {
            tokio::task::yield_now().await;
        }

        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut session)
        })
        .await
        .map_err(|e| OpsError::Task {
            message: e.to_string(),
        })?
    }

    /// Inspect the session without waiting.
    ///
    /// Fails with [`OpsError::Busy`] while a command holds the session.
    pub fn read<T>(&self, f: impl FnOnce(&Session<S>) -> T) -> Result<T, OpsError> {
        if self.is_busy() {
            return Err(OpsError::Busy);
        }
        let session = match self.session.try_lock() {
            Ok(session) => session,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(OpsError::Busy),
        };
        Ok(f(&session))
    }

    /// Receive session events. Replaces any earlier subscriber.
    pub fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<SessionEvent>, OpsError> {
        let mut session = match self.session.try_lock() {
            Ok(session) => session,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(OpsError::Busy),
        };
        Ok(session.subscribe())
    }

    pub async fn navigate(&self, path: impl Into<String>) -> Result<DirectoryListing, OpsError> {
        let path = path.into();
        self.run(move |s| s.navigate(&path).cloned()).await
    }

    pub async fn go_up(&self) -> Result<DirectoryListing, OpsError> {
        self.run(|s| s.go_up().cloned()).await
    }

    pub async fn refresh(&self) -> Result<DirectoryListing, OpsError> {
        self.run(|s| s.refresh().cloned()).await
    }

    pub async fn toggle_select(&self, path: impl Into<String>, included: bool) -> Result<(), OpsError> {
        let path = path.into();
        self.run(move |s| s.toggle_select(&path, included)).await
    }

    pub async fn mark(&self, kind: OperationKind) -> Result<usize, OpsError> {
        self.run(move |s| s.mark(kind)).await
    }

    pub async fn commit_pending(
        &self,
        mut policy: Box<dyn ConflictPolicy + Send>,
    ) -> Result<OperationComplete, OpsError> {
        self.run(move |s| s.commit_pending(&mut *policy)).await
    }

    pub async fn rename(
        &self,
        new_name: impl Into<String>,
        mut policy: Box<dyn ConflictPolicy + Send>,
    ) -> Result<OperationComplete, OpsError> {
        let new_name = new_name.into();
        self.run(move |s| s.rename(&new_name, &mut *policy)).await
    }

    pub async fn delete(&self) -> Result<OperationComplete, OpsError> {
        self.run(|s| s.delete()).await
    }

    pub async fn mkdir(&self, name: impl Into<String>) -> Result<String, OpsError> {
        let name = name.into();
        self.run(move |s| s.mkdir(&name)).await
    }

    pub async fn import_bytes(&self, name: impl Into<String>, data: Vec<u8>) -> Result<String, OpsError> {
        let name = name.into();
        self.run(move |s| s.import_bytes(&name, &data)).await
    }

    pub async fn export_selected(&self) -> Result<ExportedFile, OpsError> {
        self.run(|s| s.export_selected()).await
    }
}
