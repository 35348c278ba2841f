//! Deadline and cancellation scope for sync polling.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Time limit and/or external cancel signal bounding a single `poll` call.
///
/// A scope is checked cooperatively: the monitor looks at it once per poll
/// interval, so it never interrupts an interval already in progress.
#[derive(Debug, Clone, Default)]
pub struct SyncScope {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Triggers cancellation of the scope it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl SyncScope {
    /// A scope that only ends when cancelled, if ever.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Expires `timeout` after now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Expires at the given instant.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// Attaches an external cancel signal, keeping any deadline.
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline has been reached or cancel was triggered.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }
}

impl CancelHandle {
    /// Cancels the scope. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
