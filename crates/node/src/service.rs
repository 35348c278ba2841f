use anyhow::{Context, Result};
use async_trait::async_trait;
use libp2p::identity::Keypair;
use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};
use std::net::SocketAddr;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::NodeConfig;
use crate::lifecycle::{NodeRuntime, RunningNode, StopReason};
use crate::sync::SyncEngine;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

// Linux errno values for descriptor and buffer exhaustion
const ENOMEM: i32 = 12;
const ENFILE: i32 = 23;
const EMFILE: i32 = 24;
const ENOBUFS: i32 = 105;

/// Messaging node runtime.
///
/// Bring-up binds the messaging listener under the node's libp2p identity.
/// The messaging protocol itself lives elsewhere; inbound connections are
/// only accepted and logged here.
pub struct StatusNode {
    keypair: Keypair,
}

impl StatusNode {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn peer_id(&self) -> PeerId {
        self.keypair.public().to_peer_id()
    }
}

#[async_trait]
impl NodeRuntime for StatusNode {
    async fn start(&self, config: NodeConfig) -> Result<Arc<dyn RunningNode>> {
        config.validate()?;

        let bind = SocketAddr::new(config.listen_address, config.port);
        let listener = TcpListener::bind(bind)
            .await
            .with_context(|| format!("failed to bind messaging listener on {}", bind))?;
        let local = listener.local_addr()?;

        let peer_id = self.peer_id();
        let address = Multiaddr::from(local.ip())
            .with(Protocol::Tcp(local.port()))
            .with(Protocol::P2p(peer_id));

        info!(
            %peer_id,
            %address,
            mail_server = config.messaging.mail_server,
            boot_nodes = config.boot_nodes.len(),
            "Messaging listener bound"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (stopped_tx, stopped_rx) = watch::channel(None);
        tokio::spawn(run_loop(listener, shutdown_rx, stopped_tx));

        Ok(Arc::new(RunningStatusNode {
            address,
            shutdown: shutdown_tx,
            stopped: stopped_rx,
        }))
    }
}

struct RunningStatusNode {
    address: Multiaddr,
    shutdown: watch::Sender<bool>,
    stopped: watch::Receiver<Option<StopReason>>,
}

#[async_trait]
impl RunningNode for RunningStatusNode {
    fn address(&self) -> String {
        self.address.to_string()
    }

    fn sync_engine(&self) -> Option<Arc<dyn SyncEngine>> {
        None
    }

    fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    async fn wait(&self) -> StopReason {
        let mut stopped = self.stopped.clone();
        let reason = match stopped.wait_for(Option::is_some).await {
            Ok(reason) => reason.clone().unwrap_or(StopReason::Requested),
            Err(_) => StopReason::Failed("node loop exited without reporting".to_string()),
        };
        reason
    }
}

async fn run_loop(
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
    stopped: watch::Sender<Option<StopReason>>,
) {
    let reason = loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((_stream, peer)) => {
                    debug!(%peer, "Inbound connection");
                }
                Err(e) if is_transient_accept_error(&e) => {
                    warn!("Failed to accept inbound connection: {}", e);
                    // Give the process a chance to release descriptors
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
                Err(e) => {
                    error!("Messaging listener failed: {}", e);
                    break StopReason::Failed(e.to_string());
                }
            },
            _ = shutdown.changed() => {
                break StopReason::Requested;
            }
            res = signal::ctrl_c() => match res {
                Ok(()) => {
                    info!("Shutdown signal received");
                    break StopReason::Interrupted;
                }
                Err(e) => {
                    break StopReason::Failed(format!("signal handler: {}", e));
                }
            },
        }
    };
    stopped.send_replace(Some(reason));
}

/// Accept failures that concern a single connection or momentary resource
/// exhaustion. Anything else means the listener itself is unusable.
fn is_transient_accept_error(err: &io::Error) -> bool {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock
        | io::ErrorKind::TimedOut => true,
        _ => matches!(err.raw_os_error(), Some(ENOMEM | ENFILE | EMFILE | ENOBUFS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_exhaustion_is_transient() {
        assert!(is_transient_accept_error(&io::Error::from_raw_os_error(EMFILE)));
        assert!(is_transient_accept_error(&io::Error::from_raw_os_error(ENFILE)));
        assert!(is_transient_accept_error(&io::Error::from(io::ErrorKind::ConnectionAborted)));
    }

    #[test]
    fn test_listener_failures_are_fatal() {
        assert!(!is_transient_accept_error(&io::Error::from(io::ErrorKind::InvalidInput)));
        // EBADF: the listening socket is gone
        assert!(!is_transient_accept_error(&io::Error::from_raw_os_error(9)));
    }
}
