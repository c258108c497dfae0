//! Long-lived supervision context.
//!
//! `Supervisor` owns the registry and the termination checker for one
//! supervising process and wires them to the wait guard: a watched child is
//! registered, waited on in the background, and checked against the
//! fail-fast policy once it exits.

use crate::checker::{TerminationChecker, TerminationVerdict};
use crate::config::SupervisorConfig;
use crate::error::{Error, Result};
use crate::exit::{ExitHandler, ProcessExit};
use crate::registry::ProcessRegistry;
use crate::types::{ProcessId, ProcessRole};
use crate::wait::{WaitableProcess, wait_for_process_log_errors};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// How a watched child's life ended, from the supervisor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The exit was observed and run through the termination checker.
    Checked(TerminationVerdict),

    /// The exit could not be observed; the failure was logged and the
    /// registration kept.
    ///
    /// The child may still be running, so its entry stays until the caller
    /// removes it with [`ProcessRegistry::remove`]. At most one entry is
    /// left behind per child whose wait failed.
    Unobserved,
}

/// Supervision context for one parent process.
///
/// # Examples
///
/// ```rust,no_run
/// use child_supervisor::{ProcessRole, Supervisor, SupervisorConfig};
/// use tokio::process::Command;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let supervisor = Supervisor::new(SupervisorConfig::default());
///
///     let child = Command::new("prover").spawn()?;
///     let pid = child.id().expect("freshly spawned");
///     let watch = supervisor.watch(child, ProcessRole::Prover, module_path!())?;
///
///     // Later, before stopping the prover on purpose:
///     supervisor.expect_termination(pid.into());
///     watch.await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Supervisor {
    config: SupervisorConfig,
    checker: TerminationChecker,
}

impl Supervisor {
    /// Create a supervisor that exits the process on unexpected child death.
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_exit(config, Arc::new(ProcessExit))
    }

    /// Create a supervisor escalating through a custom exit handler.
    pub fn with_exit(config: SupervisorConfig, exit: Arc<dyn ExitHandler>) -> Self {
        Self {
            config,
            checker: TerminationChecker::new(ProcessRegistry::new(), exit),
        }
    }

    /// The registry of monitored children.
    pub fn registry(&self) -> &ProcessRegistry {
        self.checker.registry()
    }

    /// The termination checker backed by this supervisor's registry.
    pub fn checker(&self) -> &TerminationChecker {
        &self.checker
    }

    /// The configuration this supervisor was built with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Monitor `process` as a child with the given role.
    ///
    /// The child is registered before this returns, so a termination check
    /// issued from the wait task always sees it. The returned task resolves
    /// once the child has exited and been checked.
    ///
    /// With `forget_after_exit` set, an expected child is removed in the same
    /// registry operation that checks it; an escalated one stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingProcessId`] if the handle has no pid, and
    /// [`Error::NoRuntime`] when called outside a tokio runtime. Nothing is
    /// registered in either case.
    ///
    /// # Panics
    ///
    /// Panics if the pid is already registered.
    pub fn watch<P: WaitableProcess>(
        &self,
        process: P,
        role: ProcessRole,
        context: &'static str,
    ) -> Result<JoinHandle<WatchOutcome>> {
        let pid = process.id().ok_or(Error::MissingProcessId)?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        self.registry().register(pid, role);
        debug!(child_pid = pid.as_u32(), process_kind = %role, "Watching child process");

        let pending = wait_for_process_log_errors(process, context);
        let checker = self.checker.clone();
        let forget_after_exit = self.config.forget_after_exit;

        Ok(runtime.spawn(async move {
            let Some(status) = pending.exit_status().await else {
                return WatchOutcome::Unobserved;
            };

            let verdict = if forget_after_exit {
                checker.settle_exit(pid, Some(&status))
            } else {
                checker.check_exit(pid, Some(&status))
            };

            WatchOutcome::Checked(verdict)
        }))
    }

    /// Allow `pid` to exit without tripping the fail-fast policy.
    pub fn expect_termination(&self, pid: ProcessId) {
        self.registry().mark_termination_expected(pid);
    }

    /// Allow every monitored child to exit; call before tearing them down.
    pub fn shutdown(&self) {
        let flipped = self.registry().mark_all_termination_expected();
        info!(
            monitored = self.registry().len(),
            newly_expected = flipped,
            "Supervisor shutting down; child terminations are now expected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::MockExitHandler;
    use async_trait::async_trait;
    use std::io;
    use std::process::ExitStatus;

    struct NoPid;

    struct Idle(ProcessId);

    #[async_trait]
    impl WaitableProcess for Idle {
        fn id(&self) -> Option<ProcessId> {
            Some(self.0)
        }

        fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
            Ok(None)
        }

        async fn wait(&mut self) -> io::Result<ExitStatus> {
            std::future::pending().await
        }
    }

    #[async_trait]
    impl WaitableProcess for NoPid {
        fn id(&self) -> Option<ProcessId> {
            None
        }

        fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
            Ok(None)
        }

        async fn wait(&mut self) -> io::Result<ExitStatus> {
            Err(io::Error::other("unreachable"))
        }
    }

    #[tokio::test]
    async fn test_watch_without_pid_fails() {
        let supervisor = Supervisor::with_exit(SupervisorConfig::default(), Arc::new(MockExitHandler::new()));

        let result = supervisor.watch(NoPid, ProcessRole::Prover, module_path!());

        assert!(matches!(result, Err(Error::MissingProcessId)));
        assert!(supervisor.registry().is_empty());
    }

    #[test]
    fn test_watch_outside_runtime_registers_nothing() {
        let supervisor = Supervisor::with_exit(SupervisorConfig::default(), Arc::new(MockExitHandler::new()));

        let result = supervisor.watch(Idle(ProcessId::new(9)), ProcessRole::Prover, module_path!());

        assert!(matches!(result, Err(Error::NoRuntime)));
        assert!(supervisor.registry().is_empty());
        assert!(supervisor.registry().lookup(ProcessId::new(9)).is_none());
    }

    #[test]
    fn test_shutdown_marks_everything_expected() {
        let supervisor = Supervisor::with_exit(SupervisorConfig::default(), Arc::new(MockExitHandler::new()));
        supervisor.registry().register(ProcessId::new(1), ProcessRole::Prover);
        supervisor.registry().register(ProcessId::new(2), ProcessRole::Verifier);

        supervisor.shutdown();

        assert_eq!(supervisor.checker().check(ProcessId::new(1)), TerminationVerdict::Expected);
        assert_eq!(supervisor.checker().check(ProcessId::new(2)), TerminationVerdict::Expected);
    }

    #[test]
    fn test_expect_termination_single_child() {
        let mut exit = MockExitHandler::new();
        exit.expect_exit().times(1).return_const(());
        let supervisor = Supervisor::with_exit(SupervisorConfig::default(), Arc::new(exit));
        supervisor.registry().register(ProcessId::new(1), ProcessRole::Prover);
        supervisor.registry().register(ProcessId::new(2), ProcessRole::Prover);

        supervisor.expect_termination(ProcessId::new(1));

        assert_eq!(supervisor.checker().check(ProcessId::new(1)), TerminationVerdict::Expected);
        assert_eq!(supervisor.checker().check(ProcessId::new(2)), TerminationVerdict::Escalated);
    }
}
