//! `bridge`
//!
//! Runs a command, passes its stdout/stderr through untouched, and
//! terminates it when this process's own stdin closes. Exits with the
//! child's exit code once the child terminates.

use std::time::Duration;

use clap::Parser;
use tracing::debug;

use bridge_core::{Bridge, BridgeCommand, BridgeConfig, StdinMode};

#[derive(Parser, Debug)]
#[command(name = "bridge")]
#[command(version, about = "Run a command, pass its output through, terminate it when stdin closes")]
struct Args {
    /// Forward this process's stdin to the child as it arrives
    #[arg(long, env = "BRIDGE_PIPE_STDIN")]
    pipe_stdin: bool,

    /// Seconds granted at each shutdown step (natural exit after stdin
    /// closes, then SIGTERM) before escalating to SIGKILL
    #[arg(long, default_value_t = 5, env = "BRIDGE_TERMINATE_TIMEOUT")]
    terminate_timeout: u64,

    /// Log level filter (e.g. "info", "debug", "warn")
    #[arg(long, default_value = "warn", env = "BRIDGE_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation)
    #[arg(long, env = "BRIDGE_LOG_JSON")]
    log_json: bool,

    /// Command to run: <program> [args...], passed through verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_filter = format!("bridge_core={0},bridge={0}", args.log_level);
    bridge_core::tracing_init::init_tracing(&log_filter, args.log_json);

    let code = match run(args).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("bridge: {error}");
            error.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(args: Args) -> bridge_core::Result<i32> {
    let command = BridgeCommand::from_argv(args.command)?;
    let stdin_mode = if args.pipe_stdin {
        StdinMode::Piped
    } else {
        StdinMode::Detached
    };
    let config = BridgeConfig::new(command)
        .with_stdin_mode(stdin_mode)
        .with_terminate_timeout(Duration::from_secs(args.terminate_timeout));

    debug!(command = %config.command, ?stdin_mode, "Starting bridge");
    let bridge = Bridge::spawn(&config)?;
    let status = bridge.run().await?;
    Ok(bridge_core::exit::exit_code(status))
}
