mod cli;
mod config_loader;
mod keys;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use wnode_common::utils::logging::init_logging;
use wnode_node::metrics::MetricsCollector;
use wnode_node::{NodeConfig, NodeLifecycleController, StatusNode, StopReason, SyncError, SyncScope};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse CLI and build config
    let args = cli::Cli::parse();
    let config = config_loader::load_node_config(&args)?;

    // 2. Setup Logging
    init_logging(&config.logging)?;
    print_header(&config)?;

    if args.injectaccounts {
        info!("Test account injection is handled externally, skipping");
    }
    if config.messaging.notify && args.firebaseauth.is_none() {
        warn!("Push notifications enabled without a Firebase authorization key");
    }

    // 3. Load Keypair
    let keypair = keys::load_or_generate_keypair(config.key_path())?;

    let metrics = MetricsCollector::new();

    // 4. Start Node and wait till it is ready
    let mut controller = NodeLifecycleController::new(Arc::new(StatusNode::new(keypair)));
    let ready = controller.start(config.clone())?;
    ready.await.context("node start failed")?;

    let handle = controller.node_handle()?;
    if config.messaging.mail_server {
        println!("Mail server address: '{}'", handle.address());
    }

    // 5. Optionally wait for chain sync; a timeout leaves the node running degraded
    if let Some(secs) = args.sync_timeout {
        match handle.sync_monitor() {
            Some(monitor) => {
                let scope = SyncScope::with_timeout(Duration::from_secs(secs));
                match monitor.poll(&scope).await {
                    Ok(()) => info!("Chain synchronized"),
                    Err(e @ SyncError::StartTimeout) => {
                        warn!("{}, continuing without chain data", e)
                    }
                    Err(e @ SyncError::CompletionTimeout) => {
                        warn!("{}, continuing with partial chain data", e)
                    }
                }
            }
            None => info!("Node runs no chain-sync engine, skipping sync wait"),
        }
    }

    info!(address = %handle.address(), "Wnode started!");

    // 6. Wait till node has been stopped
    let reason = controller.wait_stopped().await?;
    info!("Wnode stopped!");

    match metrics.gather() {
        Ok(text) => debug!("Final metrics:\n{}", text),
        Err(e) => warn!("Failed to gather metrics: {}", e),
    }

    if let StopReason::Failed(msg) = reason {
        error!("Node stopped on error: {}", msg);
        anyhow::bail!("node failed: {}", msg);
    }
    Ok(())
}

fn print_header(config: &NodeConfig) -> anyhow::Result<()> {
    println!("Starting messaging node..");
    if config.messaging.echo_mode {
        println!(
            "Messaging config: {}",
            serde_json::to_string_pretty(&config.messaging)?
        );
    }
    Ok(())
}
