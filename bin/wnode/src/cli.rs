use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "wnode")]
#[command(about = "Status messaging node", long_about = None)]
pub struct Cli {
    /// Optional configuration file; flags override its values
    #[arg(short, long, value_name = "FILE", env = "WNODE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Whether production settings should be loaded
    #[arg(long)]
    pub production: bool,

    /// P2P node key file (private key)
    #[arg(long, value_name = "FILE")]
    pub nodekey: Option<PathBuf>,

    /// Data directory for the databases and keystore
    #[arg(long, value_name = "DIR")]
    pub datadir: Option<PathBuf>,

    /// Network identifier (integer, 1=Homestead, 3=Ropsten, 4=Rinkeby)
    #[arg(long)]
    pub networkid: Option<u64>,

    /// HTTP RPC endpoint enabled
    #[arg(long)]
    pub http: bool,

    /// HTTP RPC server's listening port
    #[arg(long)]
    pub httpport: Option<u16>,

    /// IPC RPC endpoint enabled
    #[arg(long)]
    pub ipc: bool,

    /// Echo mode, prints some arguments for diagnostics
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub echo: Option<bool>,

    /// Don't actively connect to peers, wait for incoming connections
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub bootstrap: Option<bool>,

    /// Node is capable of sending push notifications
    #[arg(long)]
    pub notify: bool,

    /// Only forward messages, neither send nor decrypt messages
    #[arg(long)]
    pub forward: bool,

    /// Delivers expired messages on demand
    #[arg(long)]
    pub mailserver: bool,

    /// Protocol identity file (private key used for asymmetric encryption)
    #[arg(long, value_name = "FILE")]
    pub identity: Option<PathBuf>,

    /// Password file (password is used for symmetric encryption)
    #[arg(long, value_name = "FILE")]
    pub password: Option<PathBuf>,

    /// Messaging node's listening port
    #[arg(long)]
    pub port: Option<u16>,

    /// PoW for messages to be added to queue
    #[arg(long)]
    pub pow: Option<f64>,

    /// Time to live for messages, in seconds
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Whether test accounts should be injected or not
    #[arg(long, action = ArgAction::Set, value_name = "BOOL", default_value_t = true)]
    pub injectaccounts: bool,

    /// FCM authorization key used for sending push notifications
    #[arg(long, env = "WNODE_FIREBASE_AUTH", hide_env_values = true)]
    pub firebaseauth: Option<String>,

    /// Wait up to this many seconds for chain sync after startup
    #[arg(long, value_name = "SECS")]
    pub sync_timeout: Option<u64>,
}
