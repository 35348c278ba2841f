//! Read-only view over the chain-sync engine.

use serde::{Deserialize, Serialize};

/// Block-height pair reported by the sync engine.
///
/// No ordering between `current` and `highest` is assumed; an engine may
/// momentarily report `current > highest` while it learns about new heads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    /// How far local sync has advanced
    pub current: u64,
    /// Best chain height known to the engine
    pub highest: u64,
}

impl SyncProgress {
    pub fn new(current: u64, highest: u64) -> Self {
        Self { current, highest }
    }

    /// Sync is complete once the local head has caught up with the best known head.
    pub fn is_complete(&self) -> bool {
        self.current >= self.highest
    }

    /// Blocks still to fetch, zero when caught up.
    pub fn remaining(&self) -> u64 {
        self.highest.saturating_sub(self.current)
    }
}

/// Minimal capability surface of the node's chain-sync engine.
///
/// Implementations are owned by the node runtime. Both calls must be cheap and
/// free of side effects, since monitors may poll them from several tasks at once.
pub trait SyncEngine: Send + Sync {
    /// Whether the engine is actively fetching or verifying blocks.
    fn synchronizing(&self) -> bool;

    /// Current and highest known block heights.
    fn progress(&self) -> SyncProgress;
}
