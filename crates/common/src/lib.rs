//! Shared plumbing for the wnode workspace: error types, configuration
//! loading and logging setup.

pub mod error;
pub mod utils;

pub use error::{Result, WnodeError};
