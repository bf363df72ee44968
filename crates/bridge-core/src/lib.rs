//! `bridge` core library
//!
//! Shared functionality for the `bridge` binary:
//! - Child command model and validation
//! - Child process supervision (spawn, input watch, shutdown ladder)
//! - Exit-code mapping
//! - Common error types

pub mod command;
pub mod config;
pub mod error;
pub mod exit;
pub mod supervisor;
pub mod tracing_init;

pub use command::BridgeCommand;
pub use config::{BridgeConfig, StdinMode};
pub use error::{Error, Result};
pub use supervisor::Bridge;
