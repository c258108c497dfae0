//! Fail-fast policy for terminated children.
//!
//! When a monitored child exits, the supervisor asks the checker what to make
//! of it. Children that were never registered, or whose exit was anticipated,
//! are ignored. Any other exit is treated as unrecoverable for the supervisor
//! itself: one error event is logged and the process exits with
//! [`UNEXPECTED_CHILD_EXIT_CODE`].

use crate::exit::{ExitHandler, UNEXPECTED_CHILD_EXIT_CODE};
use crate::registry::{ProcessRegistry, Registration};
use crate::types::ProcessId;
use std::fmt;
use std::process::ExitStatus;
use std::sync::Arc;
use tracing::error;

/// What the checker decided about a terminated child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationVerdict {
    /// The pid is not monitored; nothing to say.
    Unmonitored,

    /// The termination was anticipated.
    Expected,

    /// The termination was unexpected and the exit handler was invoked.
    ///
    /// Only observable with an exit handler that returns.
    Escalated,
}

/// Applies the fail-fast policy against a [`ProcessRegistry`].
#[derive(Clone)]
pub struct TerminationChecker {
    registry: ProcessRegistry,
    exit: Arc<dyn ExitHandler>,
}

impl TerminationChecker {
    /// Create a checker reading from `registry` and escalating through `exit`.
    pub fn new(registry: ProcessRegistry, exit: Arc<dyn ExitHandler>) -> Self {
        Self { registry, exit }
    }

    /// The registry this checker consults.
    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Check a terminated child whose exit status is not known.
    pub fn check(&self, pid: ProcessId) -> TerminationVerdict {
        self.check_exit(pid, None)
    }

    /// Check a terminated child, annotating the log event with its exit
    /// status when one is available.
    pub fn check_exit(&self, pid: ProcessId, status: Option<&ExitStatus>) -> TerminationVerdict {
        self.judge(pid, self.registry.lookup(pid), status)
    }

    /// Like [`check_exit`](Self::check_exit), but an expected child is also
    /// removed from the registry, under the same lock as the lookup.
    ///
    /// Children whose exit escalated stay registered.
    pub fn settle_exit(&self, pid: ProcessId, status: Option<&ExitStatus>) -> TerminationVerdict {
        self.judge(pid, self.registry.settle(pid), status)
    }

    fn judge(
        &self,
        pid: ProcessId,
        registration: Option<Registration>,
        status: Option<&ExitStatus>,
    ) -> TerminationVerdict {
        let Some(registration) = registration else {
            return TerminationVerdict::Unmonitored;
        };

        if registration.termination_expected {
            return TerminationVerdict::Expected;
        }

        match status {
            Some(status) => error!(
                child_pid = pid.as_u32(),
                process_kind = %registration.role,
                exit = %ExitDescription(status),
                "Monitored child process terminated unexpectedly"
            ),
            None => error!(
                child_pid = pid.as_u32(),
                process_kind = %registration.role,
                "Monitored child process terminated unexpectedly"
            ),
        }

        self.exit.exit(UNEXPECTED_CHILD_EXIT_CODE);
        TerminationVerdict::Escalated
    }
}

impl fmt::Debug for TerminationChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminationChecker")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Human-readable exit status, with a signal explanation where one is known.
struct ExitDescription<'a>(&'a ExitStatus);

impl fmt::Display for ExitDescription<'_> {
    #[cfg(unix)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::signal::{explain, termination_signal};

        if let Some(code) = self.0.code() {
            return write!(f, "exit code {code}");
        }

        match termination_signal(self.0) {
            Some(signal) => match explain(signal) {
                Some(cause) => write!(f, "signal {} ({cause})", signal.as_str()),
                None => write!(f, "signal {}", signal.as_str()),
            },
            None => write!(f, "{}", self.0),
        }
    }

    #[cfg(not(unix))]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
