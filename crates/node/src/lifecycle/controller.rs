use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::runtime::{NodeHandle, NodeRuntime, StopReason};
use super::signal::ReadySignal;
use crate::config::NodeConfig;
use crate::metrics::{NODE_BRINGUP_FAILURES, NODE_READY};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The node handle was requested before bring-up finished
    #[error("node is not ready")]
    NotReady,

    #[error("node bring-up already started")]
    AlreadyStarted,

    /// Bring-up task ended without reporting an outcome
    #[error("node bring-up aborted before signalling readiness")]
    BringUpAborted,
}

/// Starts a node in the background and keeps its handle once it is ready.
///
/// The controller is meant to be owned by a single long-lived task: it is
/// started once, its ready signal is awaited once, and `wait_stopped`
/// consumes it.
pub struct NodeLifecycleController {
    runtime: Arc<dyn NodeRuntime>,
    node: Arc<OnceLock<NodeHandle>>,
    bringup: Option<JoinHandle<()>>,
}

impl NodeLifecycleController {
    pub fn new(runtime: Arc<dyn NodeRuntime>) -> Self {
        Self {
            runtime,
            node: Arc::new(OnceLock::new()),
            bringup: None,
        }
    }

    /// Launches bring-up as its own task and returns immediately.
    ///
    /// The returned signal fires exactly once: with `Ok(())` when the node is
    /// ready, or with the runtime's own error if bring-up failed.
    pub fn start(&mut self, config: NodeConfig) -> Result<ReadySignal, LifecycleError> {
        if self.bringup.is_some() {
            return Err(LifecycleError::AlreadyStarted);
        }

        let (ready_tx, signal) = ReadySignal::channel();
        let runtime = self.runtime.clone();
        let slot = self.node.clone();

        self.bringup = Some(tokio::spawn(async move {
            info!(network_id = config.network_id, "Starting node bring-up");
            match runtime.start(config).await {
                Ok(node) => {
                    let handle = NodeHandle::new(node);
                    info!(address = %handle.address(), "Node is ready");
                    // Publish the handle before firing, so readers woken by the
                    // signal always find it.
                    let _ = slot.set(handle);
                    NODE_READY.set(1.0);
                    let _ = ready_tx.send(Ok(()));
                }
                Err(e) => {
                    error!("Node bring-up failed: {:#}", e);
                    NODE_BRINGUP_FAILURES.inc();
                    let _ = ready_tx.send(Err(e));
                }
            }
        }));

        Ok(signal)
    }

    pub fn is_ready(&self) -> bool {
        self.node.get().is_some()
    }

    /// Handle to the running node. Fails with `NotReady` until bring-up completed.
    pub fn node_handle(&self) -> Result<NodeHandle, LifecycleError> {
        self.node.get().cloned().ok_or(LifecycleError::NotReady)
    }

    /// Parks until the node stops on its own and reports why.
    ///
    /// If bring-up is still running it is awaited first. Fails with `NotReady`
    /// when the node was never started or bring-up failed, and with
    /// `BringUpAborted` when the bring-up task panicked.
    pub async fn wait_stopped(mut self) -> Result<StopReason, LifecycleError> {
        if let Some(bringup) = self.bringup.take() {
            if bringup.await.is_err() {
                return Err(LifecycleError::BringUpAborted);
            }
        }
        let handle = self.node_handle()?;
        let reason = handle.wait().await;
        NODE_READY.set(0.0);
        info!(%reason, "Node stopped");
        Ok(reason)
    }
}
