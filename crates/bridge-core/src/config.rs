//! Bridge invocation configuration.

use std::time::Duration;

use crate::command::BridgeCommand;

/// How the bridge links its own stdin to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdinMode {
    /// The child gets no input (its stdin is null). The bridge still
    /// drains its own stdin so upstream closure is observed.
    #[default]
    Detached,
    /// Bytes arriving on the bridge's stdin stream into the child's
    /// stdin as they arrive; EOF closes the child's stdin.
    Piped,
}

/// Complete configuration for one bridge invocation.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Child command line.
    pub command: BridgeCommand,
    /// Stdin link mode.
    pub stdin_mode: StdinMode,
    /// Graceful window granted at each rung of the shutdown ladder
    /// (natural exit after input closure, then SIGTERM) before SIGKILL.
    pub terminate_timeout: Duration,
}

impl BridgeConfig {
    /// Default graceful-termination window.
    pub const DEFAULT_TERMINATE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Configuration with default stdin mode and timeout.
    pub const fn new(command: BridgeCommand) -> Self {
        Self {
            command,
            stdin_mode: StdinMode::Detached,
            terminate_timeout: Self::DEFAULT_TERMINATE_TIMEOUT,
        }
    }

    /// Set the stdin link mode.
    pub fn with_stdin_mode(mut self, stdin_mode: StdinMode) -> Self {
        self.stdin_mode = stdin_mode;
        self
    }

    /// Set the graceful-termination window.
    pub fn with_terminate_timeout(mut self, terminate_timeout: Duration) -> Self {
        self.terminate_timeout = terminate_timeout;
        self
    }
}
