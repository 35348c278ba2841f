//! Node bring-up and shutdown supervision.
//!
//! `NodeLifecycleController::start` runs bring-up in the background and hands
//! back a one-shot `ReadySignal`. Once it fires the `NodeHandle` can be queried,
//! and the owner parks on `wait_stopped` until the node goes away.

pub mod controller;
pub mod runtime;
pub mod signal;

pub use controller::{LifecycleError, NodeLifecycleController};
pub use runtime::{NodeHandle, NodeRuntime, RunningNode, StopReason};
pub use signal::ReadySignal;
