//! Child process supervision.
//!
//! Spawns the child with inherited output streams, then watches two
//! things at once: the child's own termination and the closure of the
//! bridge's input stream. Child exit always drives the final status;
//! input closure starts the shutdown ladder (graceful window, SIGTERM,
//! SIGKILL).

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{self, AsyncRead, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{BridgeConfig, StdinMode};
use crate::error::{Error, Result};

/// Supervisor for a single child process.
///
/// Exclusively owns the child handle for its whole lifetime: created by
/// [`Bridge::spawn`], consumed by [`Bridge::run`].
#[derive(Debug)]
pub struct Bridge {
    child: Child,
    stdin_pipe: Option<ChildStdin>,
    terminate_timeout: Duration,
    command: String,
}

impl Bridge {
    /// Spawn the configured command.
    ///
    /// The child's stdout and stderr are inherited, so its bytes reach
    /// the bridge's streams without a copying layer. Its stdin is null
    /// ([`StdinMode::Detached`]) or a pipe fed from the bridge's input
    /// ([`StdinMode::Piped`]).
    pub fn spawn(config: &BridgeConfig) -> Result<Self> {
        let stdin = match config.stdin_mode {
            StdinMode::Detached => Stdio::null(),
            StdinMode::Piped => Stdio::piped(),
        };

        let mut cmd = Command::new(config.command.program());
        cmd.args(config.command.args())
            .stdin(stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        debug!(command = %config.command, mode = ?config.stdin_mode, "Spawning child");
        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            command: config.command.to_string(),
            source,
        })?;
        let stdin_pipe = child.stdin.take();

        Ok(Self {
            child,
            stdin_pipe,
            terminate_timeout: config.terminate_timeout,
            command: config.command.to_string(),
        })
    }

    /// Supervise the child using the bridge's own stdin as the input
    /// stream. Returns the child's exit status once it terminates.
    pub async fn run(self) -> Result<ExitStatus> {
        self.run_with_input(io::stdin()).await
    }

    /// Supervise the child, draining `input` in place of the bridge's
    /// stdin.
    ///
    /// Returns the child's exit status whether it exited on its own or
    /// was signalled after `input` closed.
    pub async fn run_with_input<R>(mut self, input: R) -> Result<ExitStatus>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let mut input_task = self.watch_input(input);

        let child_exit = tokio::select! {
            status = self.child.wait() => Some(status),
            _ = &mut input_task => None,
        };

        if let Some(status) = child_exit {
            let status = status?;
            debug!(command = %self.command, %status, "Child exited");
            input_task.abort();
            return Ok(status);
        }

        debug!(command = %self.command, "Input closed while child still running");
        self.shutdown().await
    }

    /// Drain the input stream until it closes.
    ///
    /// In piped mode the bytes stream into the child's stdin and the
    /// handle is closed at EOF so the child observes end-of-input. In
    /// detached mode the bytes are discarded; draining keeps the stream
    /// flowing so closure is observed at all.
    fn watch_input<R>(&mut self, mut input: R) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let stdin_pipe = self.stdin_pipe.take();
        tokio::spawn(async move {
            match stdin_pipe {
                Some(mut pipe) => {
                    if let Err(error) = io::copy(&mut input, &mut pipe).await {
                        debug!(%error, "Stdin forwarding stopped");
                    }
                    if let Err(error) = pipe.shutdown().await {
                        debug!(%error, "Closing child stdin failed");
                    }
                }
                None => {
                    if let Err(error) = io::copy(&mut input, &mut io::sink()).await {
                        debug!(%error, "Stdin drain stopped");
                    }
                }
            }
        })
    }

    /// Shutdown ladder after input closure: a graceful window for a
    /// natural exit (a piped child has just seen EOF), then SIGTERM,
    /// another window, then SIGKILL.
    async fn shutdown(mut self) -> Result<ExitStatus> {
        if let Ok(status) = tokio::time::timeout(self.terminate_timeout, self.child.wait()).await {
            return Ok(status?);
        }

        debug!(command = %self.command, "Child outlived its input, terminating");
        self.signal_term();

        match tokio::time::timeout(self.terminate_timeout, self.child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!(command = %self.command, "Timeout waiting for graceful shutdown, killing");
                // The child may have exited in the meantime; the kill
                // error is swallowed and wait() still reports the status.
                self.child.start_kill().ok();
                Ok(self.child.wait().await?)
            }
        }
    }

    /// Ask the child to terminate (SIGTERM).
    #[cfg(unix)]
    fn signal_term(&self) {
        if let Some(pid) = self.child.id() {
            // SAFETY: pid is a valid process ID obtained from our own Child
            // handle. kill(2) with SIGTERM is safe to call on any owned
            // subprocess; ESRCH just means it already exited.
            #[allow(unsafe_code)]
            #[allow(clippy::cast_possible_wrap)]
            let ret = unsafe { libc::kill(pid as i32, libc::SIGTERM) };
            if ret != 0 {
                let err = std::io::Error::last_os_error();
                debug!(pid, error = %err, "Failed to send SIGTERM");
            }
        }
    }

    /// No graceful signal on this platform; the SIGKILL rung of the
    /// ladder is the only termination primitive.
    #[cfg(not(unix))]
    fn signal_term(&self) {}
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::BridgeCommand;
    use crate::exit::exit_code;
    use tokio::io::AsyncWriteExt;

    fn config(parts: &[&str]) -> BridgeConfig {
        let argv = parts.iter().map(|s| (*s).to_string()).collect();
        BridgeConfig::new(BridgeCommand::from_argv(argv).unwrap())
    }

    #[tokio::test]
    async fn child_exit_code_is_mirrored() {
        let bridge = Bridge::spawn(&config(&["sh", "-c", "exit 7"])).unwrap();
        // Hold the write side open so the input never closes.
        let (_hold, input) = io::duplex(64);
        let status = bridge.run_with_input(input).await.unwrap();
        assert_eq!(exit_code(status), 7);
    }

    #[tokio::test]
    async fn successful_child_reports_success() {
        let bridge = Bridge::spawn(&config(&["true"])).unwrap();
        let (_hold, input) = io::duplex(64);
        let status = bridge.run_with_input(input).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn spawn_failure_names_the_command() {
        let err = Bridge::spawn(&config(&["nonexistent-binary-xyz", "arg"])).unwrap_err();
        assert!(err.to_string().contains("nonexistent-binary-xyz"));
        assert_eq!(err.exit_code(), 127);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn input_close_terminates_a_lingering_child() {
        let cfg =
            config(&["sleep", "30"]).with_terminate_timeout(Duration::from_millis(200));
        let bridge = Bridge::spawn(&cfg).unwrap();
        // Immediate EOF: the child outlives its input and gets SIGTERM
        // after the graceful window.
        let status = bridge.run_with_input(io::empty()).await.unwrap();
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(status.signal(), Some(libc::SIGTERM));
        assert_eq!(exit_code(status), 128 + libc::SIGTERM);
    }

    #[tokio::test]
    async fn piped_child_sees_bytes_then_eof() {
        let cfg = config(&["cat"]).with_stdin_mode(StdinMode::Piped);
        let bridge = Bridge::spawn(&cfg).unwrap();

        let (mut writer, input) = io::duplex(64);
        let supervision = tokio::spawn(bridge.run_with_input(input));
        writer.write_all(b"abc").await.unwrap();
        drop(writer);

        // cat exits on end-of-input, within the graceful window, with
        // its own code rather than a forced kill.
        let status = supervision.await.unwrap().unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn fast_child_wins_over_open_input() {
        // The input stays open; the child exiting first must still
        // resolve the supervision promptly.
        let cfg = config(&["true"]).with_stdin_mode(StdinMode::Piped);
        let bridge = Bridge::spawn(&cfg).unwrap();
        let (_hold, input) = io::duplex(64);
        let status = bridge.run_with_input(input).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn input_close_after_child_exit_is_a_noop() {
        // The child is long gone by the time the (already closed) input
        // is observed; supervision must resolve to the child's status,
        // not an error.
        let cfg = config(&["true"]).with_terminate_timeout(Duration::from_millis(100));
        let bridge = Bridge::spawn(&cfg).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let status = bridge.run_with_input(io::empty()).await.unwrap();
        assert!(status.success());
    }
}
