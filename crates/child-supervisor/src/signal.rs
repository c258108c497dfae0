//! Best-effort explanations for termination signals.
//!
//! The table is advisory: it annotates log events and is never consulted to
//! decide what the supervisor does.

use nix::sys::signal::Signal;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

static SIGNAL_CAUSES: Lazy<HashMap<Signal, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // The kernel OOM killer uses SIGKILL.
        (Signal::SIGKILL, "Process killed because out of memory"),
        (Signal::SIGINT, "Process interrupted by user or other program"),
    ])
});

/// Explain why a process terminated by `signal` may have died.
///
/// ```rust
/// use child_supervisor::signal::explain;
/// use nix::sys::signal::Signal;
///
/// assert_eq!(explain(Signal::SIGINT), Some("Process interrupted by user or other program"));
/// assert_eq!(explain(Signal::SIGTERM), None);
/// ```
pub fn explain(signal: Signal) -> Option<&'static str> {
    SIGNAL_CAUSES.get(&signal).copied()
}

/// The signal that terminated a finished child, if any.
///
/// Returns `None` for a normal exit and for raw signal numbers `nix` does not
/// know about.
pub fn termination_signal(status: &ExitStatus) -> Option<Signal> {
    status.signal().and_then(|raw| Signal::try_from(raw).ok())
}
