//! Chain synchronization monitoring.
//!
//! Observes an external sync engine and reports when it has started and
//! caught up with the network, under a caller supplied deadline.

pub mod engine;
pub mod monitor;
pub mod scope;

pub use engine::{SyncEngine, SyncProgress};
pub use monitor::{MonitorState, SyncError, SyncMonitor, DEFAULT_POLL_INTERVAL};
pub use scope::{CancelHandle, SyncScope};
