use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::engine::SyncEngine;
use super::scope::SyncScope;
use crate::metrics;

/// Fixed period between two checks of the sync engine.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why a poll call gave up.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Sync never began before the scope ended.
    #[error("node synchronization timeout before starting")]
    StartTimeout,

    /// Sync began but did not catch up before the scope ended.
    #[error("node synchronization timeout before completion")]
    CompletionTimeout,
}

impl SyncError {
    fn outcome(&self) -> &'static str {
        match self {
            SyncError::StartTimeout => "start_timeout",
            SyncError::CompletionTimeout => "completion_timeout",
        }
    }
}

/// Progress of the current (or last) poll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    /// Waiting for the engine to report that it is synchronizing
    #[default]
    NotStarted,
    /// Engine is synchronizing, waiting for `current >= highest`
    Synchronizing,
    /// Caught up with the network head
    Completed,
    /// Scope ended first
    Aborted(SyncError),
}

impl MonitorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MonitorState::Completed | MonitorState::Aborted(_))
    }
}

/// Two-phase poller reporting when chain sync has started and finished.
///
/// The monitor only reads from its engine. Every `poll` runs the phases
/// sequentially from scratch, so calls with fresh scopes never see state
/// left over from an earlier call.
///
/// Polling concurrently on one monitor is allowed, but all calls publish into
/// the same state channel; `state` and `subscribe` only describe a single call
/// when one `poll` runs at a time. Use a monitor per caller otherwise.
pub struct SyncMonitor {
    engine: Arc<dyn SyncEngine>,
    interval: Duration,
    state: watch::Sender<MonitorState>,
}

impl SyncMonitor {
    pub fn new(engine: Arc<dyn SyncEngine>) -> Self {
        Self::with_interval(engine, DEFAULT_POLL_INTERVAL)
    }

    /// Polls at `interval` instead of the default. A zero period is raised to 1ms.
    pub fn with_interval(engine: Arc<dyn SyncEngine>, interval: Duration) -> Self {
        let (state, _) = watch::channel(MonitorState::NotStarted);
        Self {
            engine,
            interval: interval.max(Duration::from_millis(1)),
            state,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// State of the most recent poll call.
    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    /// Watch state transitions of subsequent poll calls.
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    /// Waits for sync to start and then to complete, within `scope`.
    ///
    /// Each check happens one full interval after the previous one (or after
    /// entering the phase); an engine that is already synced is therefore
    /// reported with one interval of latency per phase. The scope is looked at
    /// before the engine on every tick, so an expired scope wins over a
    /// simultaneously satisfied condition.
    pub async fn poll(&self, scope: &SyncScope) -> Result<(), SyncError> {
        let started = Instant::now();
        self.transition(MonitorState::NotStarted);

        let result = match self.wait_for_start(scope).await {
            Ok(()) => {
                self.transition(MonitorState::Synchronizing);
                self.wait_for_completion(scope).await
            }
            Err(e) => Err(e),
        };

        let elapsed = started.elapsed();
        match result {
            Ok(()) => {
                self.transition(MonitorState::Completed);
                metrics::record_sync_outcome("completed", elapsed.as_secs_f64());
                info!(elapsed_ms = elapsed.as_millis() as u64, "Node synchronization completed");
            }
            Err(e) => {
                self.transition(MonitorState::Aborted(e));
                metrics::record_sync_outcome(e.outcome(), elapsed.as_secs_f64());
                warn!(elapsed_ms = elapsed.as_millis() as u64, "Sync poll aborted: {}", e);
            }
        }
        result
    }

    async fn wait_for_start(&self, scope: &SyncScope) -> Result<(), SyncError> {
        let mut ticker = self.ticker();
        loop {
            ticker.tick().await;
            if scope.is_done() {
                return Err(SyncError::StartTimeout);
            }
            metrics::record_sync_check("start");
            if self.engine.synchronizing() {
                return Ok(());
            }
        }
    }

    async fn wait_for_completion(&self, scope: &SyncScope) -> Result<(), SyncError> {
        let mut ticker = self.ticker();
        loop {
            ticker.tick().await;
            if scope.is_done() {
                return Err(SyncError::CompletionTimeout);
            }
            metrics::record_sync_check("completion");
            let progress = self.engine.progress();
            debug!(
                current = progress.current,
                highest = progress.highest,
                remaining = progress.remaining(),
                "Sync progress"
            );
            if progress.is_complete() {
                return Ok(());
            }
        }
    }

    // First tick fires one full period after the phase begins.
    fn ticker(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    fn transition(&self, next: MonitorState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(from = ?prev, to = ?next, "Sync monitor state changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncProgress;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// Engine whose `synchronizing` flag flips after a delay and whose
    /// progress advances by `step` on every read.
    ///
    /// The step is applied before a read is returned, so with step 25 the reads
    /// are 25, 50, 75, 100: four checks in phase two, 3 + 4 intervals overall.
    /// Reporting `{0,100}` first would need a fifth check and finish at 800ms.
    struct ScriptedEngine {
        created: Instant,
        starts_after: Option<Duration>,
        current: AtomicU64,
        step: u64,
        highest: u64,
        progress_reads: AtomicU64,
    }

    impl ScriptedEngine {
        fn new(starts_after: Option<Duration>, step: u64, highest: u64) -> Self {
            Self {
                created: Instant::now(),
                starts_after,
                current: AtomicU64::new(0),
                step,
                highest,
                progress_reads: AtomicU64::new(0),
            }
        }
    }

    impl SyncEngine for ScriptedEngine {
        fn synchronizing(&self) -> bool {
            self.starts_after
                .map(|after| self.created.elapsed() >= after)
                .unwrap_or(false)
        }

        fn progress(&self) -> SyncProgress {
            self.progress_reads.fetch_add(1, Ordering::SeqCst);
            let current = self.current.fetch_add(self.step, Ordering::SeqCst) + self.step;
            SyncProgress::new(current.min(self.highest), self.highest)
        }
    }

    struct FixedEngine {
        synchronizing: AtomicBool,
        progress: SyncProgress,
    }

    impl SyncEngine for FixedEngine {
        fn synchronizing(&self) -> bool {
            self.synchronizing.load(Ordering::SeqCst)
        }

        fn progress(&self) -> SyncProgress {
            self.progress
        }
    }

    fn fixed(synchronizing: bool, current: u64, highest: u64) -> Arc<FixedEngine> {
        Arc::new(FixedEngine {
            synchronizing: AtomicBool::new(synchronizing),
            progress: SyncProgress::new(current, highest),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_then_progress_to_completion() {
        let engine = Arc::new(ScriptedEngine::new(Some(Duration::from_millis(250)), 25, 100));
        let monitor = SyncMonitor::new(engine.clone());
        let scope = SyncScope::with_timeout(Duration::from_secs(1));

        let started = Instant::now();
        assert_eq!(monitor.poll(&scope).await, Ok(()));

        // 3 ticks to see the start, 4 more to see {100,100}
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(700));
        assert!(elapsed < Duration::from_millis(720));
        assert_eq!(engine.progress_reads.load(Ordering::SeqCst), 4);
        assert_eq!(monitor.state(), MonitorState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_deadline_reports_start_timeout() {
        let monitor = SyncMonitor::new(fixed(false, 0, 0));
        let scope = SyncScope::with_timeout(Duration::from_millis(50));

        let started = Instant::now();
        assert_eq!(monitor.poll(&scope).await, Err(SyncError::StartTimeout));

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed <= Duration::from_millis(150));
        assert_eq!(monitor.state(), MonitorState::Aborted(SyncError::StartTimeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_ends_within_one_interval() {
        let monitor = SyncMonitor::new(fixed(false, 0, 0));
        let (scope, cancel) = SyncScope::unbounded().cancellable();

        let started = Instant::now();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            cancel.cancel();
        });

        assert_eq!(monitor.poll(&scope).await, Err(SyncError::StartTimeout));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(250));
        assert!(elapsed <= Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_sync_reports_completion_timeout() {
        let monitor = SyncMonitor::new(fixed(true, 10, 100));
        let scope = SyncScope::with_timeout(Duration::from_millis(500));

        assert_eq!(monitor.poll(&scope).await, Err(SyncError::CompletionTimeout));
        assert_eq!(
            monitor.state(),
            MonitorState::Aborted(SyncError::CompletionTimeout)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_synced_still_waits_an_interval_per_phase() {
        let monitor = SyncMonitor::new(fixed(true, 100, 100));
        let scope = SyncScope::with_timeout(Duration::from_secs(1));

        let started = Instant::now();
        assert_eq!(monitor.poll(&scope).await, Ok(()));
        let elapsed = started.elapsed();
        assert!(elapsed >= 2 * DEFAULT_POLL_INTERVAL);
        assert!(elapsed < 2 * DEFAULT_POLL_INTERVAL + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scope_expiry_wins_tie_with_start() {
        // Sync starts at 250ms and the deadline lands exactly on the 300ms tick
        let engine = Arc::new(ScriptedEngine::new(Some(Duration::from_millis(250)), 100, 100));
        let monitor = SyncMonitor::new(engine);
        let scope = SyncScope::with_timeout(Duration::from_millis(300));

        assert_eq!(monitor.poll(&scope).await, Err(SyncError::StartTimeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scope_expiry_wins_tie_with_completion() {
        // Start seen at 100ms, deadline lands on the first completion tick at 200ms
        let monitor = SyncMonitor::new(fixed(true, 5, 5));
        let scope = SyncScope::with_timeout(Duration::from_millis(200));

        assert_eq!(monitor.poll(&scope).await, Err(SyncError::CompletionTimeout));
        assert_eq!(
            monitor.state(),
            MonitorState::Aborted(SyncError::CompletionTimeout)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_scope_still_waits_one_interval() {
        let monitor = SyncMonitor::new(fixed(true, 100, 100));
        let (scope, cancel) = SyncScope::unbounded().cancellable();
        cancel.cancel();

        let started = Instant::now();
        assert_eq!(monitor.poll(&scope).await, Err(SyncError::StartTimeout));
        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_POLL_INTERVAL);
        assert!(elapsed < DEFAULT_POLL_INTERVAL + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_polls_are_independent() {
        let engine = fixed(false, 0, 100);
        let monitor = SyncMonitor::new(engine.clone());

        let first = SyncScope::with_timeout(Duration::from_millis(200));
        assert_eq!(monitor.poll(&first).await, Err(SyncError::StartTimeout));

        engine.synchronizing.store(true, Ordering::SeqCst);
        let second = SyncScope::with_timeout(Duration::from_millis(400));
        assert_eq!(monitor.poll(&second).await, Err(SyncError::CompletionTimeout));

        let synced = fixed(true, 100, 100);
        let monitor = SyncMonitor::new(synced);
        let third = SyncScope::with_timeout(Duration::from_secs(1));
        assert_eq!(monitor.poll(&third).await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let monitor = SyncMonitor::new(fixed(true, 5, 10));
        let mut rx = monitor.subscribe();
        let scope = SyncScope::with_timeout(Duration::from_millis(300));

        assert_eq!(monitor.poll(&scope).await, Err(SyncError::CompletionTimeout));
        assert!(rx.has_changed().unwrap());
        let state = *rx.borrow_and_update();
        assert!(state.is_terminal());
        assert_eq!(state, MonitorState::Aborted(SyncError::CompletionTimeout));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let monitor = SyncMonitor::with_interval(fixed(false, 0, 0), Duration::ZERO);
        assert_eq!(monitor.interval(), Duration::from_millis(1));
    }
}
