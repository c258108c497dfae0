//! Fatal escalation: how the supervisor takes itself down.

/// Exit status reserved for "a monitored child terminated unexpectedly".
///
/// Distinct from the ordinary error codes a supervisor binary uses, so the
/// cause of death is recognisable from the outside.
pub const UNEXPECTED_CHILD_EXIT_CODE: i32 = 99;

/// Capability to terminate the current process.
///
/// [`ProcessExit`] is the real thing. Tests substitute an implementation that
/// records the requested status and returns, so "would have exited with 99"
/// can be asserted without killing the test binary.
#[cfg_attr(test, mockall::automock)]
pub trait ExitHandler: Send + Sync {
    /// Terminate the process with `code`.
    ///
    /// The production implementation never returns.
    fn exit(&self, code: i32);
}

/// Exits the running process through [`std::process::exit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl ExitHandler for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}
