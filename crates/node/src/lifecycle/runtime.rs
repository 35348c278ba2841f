use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::NodeConfig;
use crate::sync::{SyncEngine, SyncMonitor};

/// Why a running node stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Process received an interrupt signal
    Interrupted,
    /// `shutdown` was called on the node
    Requested,
    /// The node hit an unrecoverable internal error
    Failed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::Requested => write!(f, "shutdown requested"),
            StopReason::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

/// Brings a node up. Implemented by the concrete node backend.
#[async_trait]
pub trait NodeRuntime: Send + Sync + 'static {
    /// Runs bring-up to completion. Any error is fatal for the node.
    async fn start(&self, config: NodeConfig) -> Result<Arc<dyn RunningNode>>;
}

/// A node that finished bring-up.
#[async_trait]
pub trait RunningNode: Send + Sync {
    /// Address other nodes can use to reach this one.
    fn address(&self) -> String;

    /// Chain-sync engine, if this node runs one.
    fn sync_engine(&self) -> Option<Arc<dyn SyncEngine>>;

    /// Ask the node to stop.
    fn shutdown(&self);

    /// Resolves once the node has stopped.
    async fn wait(&self) -> StopReason;
}

/// Reference to the running node, available once the ready signal fired.
#[derive(Clone)]
pub struct NodeHandle {
    node: Arc<dyn RunningNode>,
}

impl NodeHandle {
    pub(crate) fn new(node: Arc<dyn RunningNode>) -> Self {
        Self { node }
    }

    pub fn address(&self) -> String {
        self.node.address()
    }

    /// Monitor bound to the node's sync engine, `None` if the node has no engine.
    pub fn sync_monitor(&self) -> Option<SyncMonitor> {
        self.node.sync_engine().map(SyncMonitor::new)
    }

    pub fn shutdown(&self) {
        self.node.shutdown()
    }

    pub(crate) async fn wait(&self) -> StopReason {
        self.node.wait().await
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("address", &self.node.address())
            .finish()
    }
}
