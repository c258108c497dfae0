//! # child-supervisor
//!
//! Fail-fast supervision of the child processes a parent depends on.
//!
//! The parent registers every child it spawns together with its role. When a
//! child exits, the termination checker decides whether that was anticipated;
//! if not, it logs a structured error and takes the parent down with exit
//! status [`UNEXPECTED_CHILD_EXIT_CODE`]. Children are never restarted.
//!
//! ## Building blocks
//!
//! - [`ProcessRegistry`]: who is monitored, in what role, and whether their
//!   exit is expected
//! - [`TerminationChecker`]: the fail-fast policy
//! - [`wait_for_process_log_errors`]: race-free background wait that logs
//!   wait failures instead of propagating them
//! - [`signal::explain`]: advisory explanations for termination signals
//! - [`Supervisor`]: ties the above together for one parent process
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use child_supervisor::{ProcessRole, Supervisor, SupervisorConfig, WatchOutcome};
//! use tokio::process::Command;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SupervisorConfig::from_file("supervisor.toml")?;
//!     child_supervisor::logging::init(&config.logging)?;
//!
//!     let supervisor = Supervisor::new(config);
//!     let verifier = Command::new("verifier").spawn()?;
//!     let watch = supervisor.watch(verifier, ProcessRole::Verifier, module_path!())?;
//!
//!     supervisor.shutdown();
//!     if let WatchOutcome::Checked(verdict) = watch.await? {
//!         println!("verifier exit checked: {verdict:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod checker;
pub mod config;
pub mod error;
pub mod exit;
pub mod logging;
pub mod registry;
#[cfg(unix)]
pub mod signal;
pub mod supervisor;
pub mod types;
pub mod wait;

pub use checker::{TerminationChecker, TerminationVerdict};
pub use config::{LoggingConfig, SupervisorConfig};
pub use error::{Error, Result};
pub use exit::{ExitHandler, ProcessExit, UNEXPECTED_CHILD_EXIT_CODE};
pub use registry::{ProcessRegistry, Registration};
pub use supervisor::{Supervisor, WatchOutcome};
pub use types::{ProcessId, ProcessRole};
pub use wait::{PendingExit, WaitableProcess, wait_for_process_log_errors};
