//! Exit-code mapping from child status to the bridge's own exit code.
//!
//! The bridge mirrors the child's exit code once known. A child that was
//! terminated by a signal maps to the shell convention 128 + signal
//! number (SIGTERM -> 143, SIGKILL -> 137).

use std::process::ExitStatus;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

/// Map a child [`ExitStatus`] to the bridge's process exit code.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    if let Some(signal) = status.signal() {
        return 128 + signal;
    }
    1
}
