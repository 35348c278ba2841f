use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use wnode_common::utils::logging::LoggingConfig;
use wnode_common::{Result, WnodeError};

pub const ROPSTEN_NETWORK_ID: u64 = 3;
pub const DEFAULT_MESSAGING_PORT: u16 = 30303;
pub const DEFAULT_HTTP_PORT: u16 = 8545;
pub const DEFAULT_MIN_POW: f64 = 0.001;
pub const DEFAULT_TTL_SECS: u32 = 120;

/// Mail server that every node dials first to fetch expired messages.
pub const DEFAULT_MAIL_NODE: &str = "enode://859bc9f0919a8bffa5a73bb8f55997aa990bf38771dd09b037db37c9efc311fc069ba146511c2b0a98bff14ed29f46982872c64b59da0f0eee0a9edaac17f599@[::]:39544?discport=0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub data_dir: PathBuf,
    pub network_id: u64,
    /// Load production settings
    pub production: bool,
    pub listen_address: IpAddr,
    /// Messaging protocol listening port
    pub port: u16,
    /// P2P node key file; generated under `data_dir` when unset
    pub node_key_file: Option<PathBuf>,
    pub boot_nodes: Vec<String>,
    pub http: HttpConfig,
    pub ipc_enabled: bool,
    pub messaging: MessagingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub port: u16,
}

/// Messaging protocol parameters. Passed through to the protocol layer as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Print the effective configuration on startup
    pub echo_mode: bool,
    /// Don't actively connect to peers, wait for incoming connections
    pub bootstrap: bool,
    /// Only forward messages, neither send nor decrypt them
    pub forward: bool,
    /// Deliver expired messages on demand
    pub mail_server: bool,
    /// Node is capable of sending push notifications
    pub notify: bool,
    pub min_pow: f64,
    pub ttl: u32,
    pub identity_file: Option<PathBuf>,
    pub password_file: Option<PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("wnode-status-data"),
            network_id: ROPSTEN_NETWORK_ID,
            production: false,
            listen_address: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_MESSAGING_PORT,
            node_key_file: None,
            boot_nodes: Vec::new(),
            http: HttpConfig::default(),
            ipc_enabled: false,
            messaging: MessagingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: DEFAULT_HTTP_PORT,
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            echo_mode: true,
            bootstrap: true,
            forward: false,
            mail_server: false,
            notify: false,
            min_pow: DEFAULT_MIN_POW,
            ttl: DEFAULT_TTL_SECS,
            identity_file: None,
            password_file: None,
        }
    }
}

impl NodeConfig {
    /// Key file used for the node identity.
    pub fn key_path(&self) -> PathBuf {
        self.node_key_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("node.key"))
    }

    /// Puts `enode` in front of the configured boot nodes unless already listed.
    pub fn prepend_boot_node(&mut self, enode: &str) {
        if !self.boot_nodes.iter().any(|n| n == enode) {
            self.boot_nodes.insert(0, enode.to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.enabled && self.http.port == 0 {
            return Err(WnodeError::Config("HTTP port must be set when HTTP is enabled".into()));
        }
        if !self.messaging.min_pow.is_finite() || self.messaging.min_pow <= 0.0 {
            return Err(WnodeError::Config(format!(
                "minimum PoW must be positive, got {}",
                self.messaging.min_pow
            )));
        }
        if self.messaging.ttl == 0 {
            return Err(WnodeError::Config("message TTL must be non-zero".into()));
        }
        Ok(())
    }
}
