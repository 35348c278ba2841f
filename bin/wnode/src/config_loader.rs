use anyhow::{Context, Result};
use wnode_common::utils::config::load_config;
use wnode_node::config::DEFAULT_MAIL_NODE;
use wnode_node::NodeConfig;

use crate::cli::Cli;

/// Builds the node configuration: file (if any), then command-line overrides.
pub fn load_node_config(args: &Cli) -> Result<NodeConfig> {
    let mut config: NodeConfig = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {:?}", path))?,
        None => NodeConfig::default(),
    };

    apply_overrides(&mut config, args);
    config.prepend_boot_node(DEFAULT_MAIL_NODE);
    config.validate().context("invalid node configuration")?;

    Ok(config)
}

fn apply_overrides(config: &mut NodeConfig, args: &Cli) {
    if args.production {
        config.production = true;
    }
    if let Some(path) = &args.nodekey {
        config.node_key_file = Some(path.clone());
    }
    if let Some(dir) = &args.datadir {
        config.data_dir = dir.clone();
    }
    if let Some(id) = args.networkid {
        config.network_id = id;
    }
    if args.http {
        config.http.enabled = true;
    }
    if let Some(port) = args.httpport {
        config.http.port = port;
    }
    if args.ipc {
        config.ipc_enabled = true;
    }

    let messaging = &mut config.messaging;
    if let Some(echo) = args.echo {
        messaging.echo_mode = echo;
    }
    if let Some(bootstrap) = args.bootstrap {
        messaging.bootstrap = bootstrap;
    }
    if args.notify {
        messaging.notify = true;
    }
    if args.forward {
        messaging.forward = true;
    }
    if args.mailserver {
        messaging.mail_server = true;
    }
    if let Some(path) = &args.identity {
        messaging.identity_file = Some(path.clone());
    }
    if let Some(path) = &args.password {
        messaging.password_file = Some(path.clone());
    }
    if let Some(pow) = args.pow {
        messaging.min_pow = pow;
    }
    if let Some(ttl) = args.ttl {
        messaging.ttl = ttl;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "network_id = 4\nport = 30000\n\n[messaging]\nttl = 60").unwrap();

        let args = Cli {
            config: Some(file.path().to_path_buf()),
            port: Some(40404),
            mailserver: true,
            ..Default::default()
        };
        let config = load_node_config(&args).unwrap();

        assert_eq!(config.network_id, 4);
        assert_eq!(config.port, 40404);
        assert_eq!(config.messaging.ttl, 60);
        assert!(config.messaging.mail_server);
        assert_eq!(config.boot_nodes[0], DEFAULT_MAIL_NODE);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Cli {
            pow: Some(-1.0),
            ..Default::default()
        };
        assert!(load_node_config(&args).is_err());
    }
}
