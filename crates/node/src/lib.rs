pub mod config;
pub mod lifecycle;
pub mod metrics;
pub mod service;
pub mod sync;

pub use config::NodeConfig;
pub use lifecycle::{LifecycleError, NodeHandle, NodeLifecycleController, ReadySignal, StopReason};
pub use service::StatusNode;
pub use sync::{SyncEngine, SyncError, SyncMonitor, SyncProgress, SyncScope};
