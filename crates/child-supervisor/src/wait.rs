//! Waiting on child processes without letting wait failures escape.
//!
//! [`wait_for_process_log_errors`] starts the wait on a child synchronously,
//! then finishes it on a background tokio task. Failures to observe the exit,
//! whether they happen when the wait is started or while it is pending, are
//! logged at error level and swallowed. They say nothing about whether the
//! child itself failed.

use crate::types::ProcessId;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::io;
use std::panic::AssertUnwindSafe;
use std::process::ExitStatus;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::error;

/// A spawned process that can be waited on.
#[async_trait]
pub trait WaitableProcess: Send + 'static {
    /// The process id, or `None` once the process has been reaped.
    fn id(&self) -> Option<ProcessId>;

    /// Reap the process if it has already exited, without blocking.
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;

    /// Wait for the process to exit.
    async fn wait(&mut self) -> io::Result<ExitStatus>;
}

#[async_trait]
impl WaitableProcess for tokio::process::Child {
    fn id(&self) -> Option<ProcessId> {
        tokio::process::Child::id(self).map(ProcessId::from)
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        tokio::process::Child::try_wait(self)
    }

    async fn wait(&mut self) -> io::Result<ExitStatus> {
        tokio::process::Child::wait(self).await
    }
}

/// Exit status of a child being waited on by the background task.
#[derive(Debug)]
pub struct PendingExit {
    pid: Option<ProcessId>,
    context: &'static str,
    state: PendingState,
}

#[derive(Debug)]
enum PendingState {
    Ready(Option<ExitStatus>),
    Waiting(JoinHandle<Option<ExitStatus>>),
}

impl PendingExit {
    fn ready(pid: Option<ProcessId>, context: &'static str, status: Option<ExitStatus>) -> Self {
        Self {
            pid,
            context,
            state: PendingState::Ready(status),
        }
    }

    /// Pid of the child, captured when the wait was started.
    pub fn pid(&self) -> Option<ProcessId> {
        self.pid
    }

    /// Whether the exit status is already known.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            PendingState::Ready(_) => true,
            PendingState::Waiting(task) => task.is_finished(),
        }
    }

    /// Resolve to the child's exit status.
    ///
    /// Returns `None` when the exit could not be observed; the failure has
    /// already been logged by then.
    pub async fn exit_status(self) -> Option<ExitStatus> {
        match self.state {
            PendingState::Ready(status) => status,
            PendingState::Waiting(task) => match task.await {
                Ok(status) => status,
                Err(e) => {
                    // Panics are caught inside the task; this is the task
                    // being cancelled, e.g. its runtime shut down.
                    error!(
                        context = self.context,
                        child_pid = self.pid.map(ProcessId::as_u32),
                        error = %e,
                        "Failed to wait for child process"
                    );
                    None
                }
            },
        }
    }
}

/// Wait for `process` to exit, logging instead of propagating wait failures.
///
/// The wait is started before this function returns: the child is reaped
/// immediately if it has already exited, and the handle itself moves into
/// the guard so the result is tied to this child and never to a pid the OS
/// may since have handed to another process. Only consuming the result is
/// deferred to a background task on the current tokio runtime.
///
/// `context` tags every error event, typically with the caller's location
/// (`module_path!()` or `concat!(file!(), ":", line!())`).
///
/// Nothing is logged when the wait succeeds; feed the resolved status into
/// [`TerminationChecker::check_exit`](crate::TerminationChecker::check_exit).
pub fn wait_for_process_log_errors<P: WaitableProcess>(mut process: P, context: &'static str) -> PendingExit {
    let pid = process.id();
    let child_pid = pid.map(ProcessId::as_u32);

    let reaped = match process.try_wait() {
        Ok(status) => status,
        Err(e) => {
            error!(context, child_pid, error = %e, "Failed to start waiting for child process");
            return PendingExit::ready(pid, context, None);
        }
    };

    if reaped.is_some() {
        return PendingExit::ready(pid, context, reaped);
    }

    let runtime = match Handle::try_current() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(context, child_pid, error = %e, "Failed to start waiting for child process");
            return PendingExit::ready(pid, context, None);
        }
    };

    let task = runtime.spawn(async move {
        match AssertUnwindSafe(process.wait()).catch_unwind().await {
            Ok(Ok(status)) => Some(status),
            Ok(Err(e)) => {
                error!(context, child_pid, error = %e, "Failed to wait for child process");
                None
            }
            Err(panic) => {
                error!(
                    context,
                    child_pid,
                    error = panic_message(&*panic),
                    "Failed to wait for child process"
                );
                None
            }
        }
    });

    PendingExit {
        pid,
        context,
        state: PendingState::Waiting(task),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "wait panicked"
    }
}
