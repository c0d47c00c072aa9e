//! Single-flight run guard and cooperative cancellation flag

use crate::error::{RunError, RunResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Process-wide run state: at most one run is active at any time.
#[derive(Debug, Default)]
pub struct RunGuard {
    active: AtomicBool,
    cancel_requested: AtomicBool,
    cancel_notify: Notify,
}

impl RunGuard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the run slot, failing with `AlreadyRunning` if it is taken.
    ///
    /// The slot is released when the returned `RunSlot` drops.
    pub fn try_claim(self: &Arc<Self>) -> RunResult<RunSlot> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| RunError::AlreadyRunning)?;

        // A cancel issued while idle must not leak into the new run
        self.cancel_requested.store(false, Ordering::SeqCst);

        Ok(RunSlot {
            guard: Arc::clone(self),
        })
    }

    /// Ask the active run to stop at its next account boundary.
    ///
    /// Idempotent, and harmless when no run is active.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
        self.cancel_notify.notify_waiters();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        loop {
            let notified = self.cancel_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_cancel_requested() {
                return;
            }
            notified.await;
        }
    }
}

/// Ownership of the run slot for the duration of one run
#[derive(Debug)]
pub struct RunSlot {
    guard: Arc<RunGuard>,
}

impl RunSlot {
    pub fn is_cancelled(&self) -> bool {
        self.guard.is_cancel_requested()
    }

    pub async fn cancelled(&self) {
        self.guard.cancelled().await
    }
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        self.guard.cancel_requested.store(false, Ordering::SeqCst);
        self.guard.active.store(false, Ordering::SeqCst);
    }
}
