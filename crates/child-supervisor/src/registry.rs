//! Registry of monitored child processes.
//!
//! This module provides the `ProcessRegistry` and `Registration` types used to
//! record which children the supervisor depends on, what role each plays, and
//! whether its termination has been anticipated.

use crate::types::{ProcessId, ProcessRole};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// What the supervisor knows about one monitored child.
///
/// `termination_expected` starts out `false` and can only ever be flipped to
/// `true` through [`ProcessRegistry::mark_termination_expected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Role of the child
    pub role: ProcessRole,

    /// Whether the supervisor anticipates this child exiting
    pub termination_expected: bool,
}

impl Registration {
    /// Create a registration for `role` whose termination is not expected.
    pub const fn new(role: ProcessRole) -> Self {
        Self {
            role,
            termination_expected: false,
        }
    }
}

/// Thread-safe table of monitored children keyed by pid.
///
/// Cloning the registry is cheap and every clone shares the same table, so a
/// supervisor can hand copies to background tasks without any global state.
///
/// # Thread Safety
///
/// The table sits behind a `parking_lot::RwLock`:
/// - lookups take a shared lock
/// - register, mark, remove and settle take an exclusive lock for the whole
///   read-modify-write
///
/// # Examples
///
/// ```rust
/// use child_supervisor::{ProcessId, ProcessRegistry, ProcessRole};
///
/// let registry = ProcessRegistry::new();
/// let pid = ProcessId::new(4242);
///
/// registry.register(pid, ProcessRole::Prover);
/// assert!(!registry.lookup(pid).unwrap().termination_expected);
///
/// registry.mark_termination_expected(pid);
/// assert!(registry.lookup(pid).unwrap().termination_expected);
///
/// registry.remove(pid);
/// assert!(registry.lookup(pid).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    processes: Arc<RwLock<HashMap<ProcessId, Registration>>>,
}

impl ProcessRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start monitoring `pid`; its termination is not expected.
    ///
    /// # Panics
    ///
    /// Panics if `pid` is already registered. A duplicate means the caller
    /// lost track of a child and must not be papered over.
    pub fn register(&self, pid: ProcessId, role: ProcessRole) {
        self.register_with(pid, role, false);
    }

    /// Start monitoring `pid` with an explicit expectation flag.
    ///
    /// # Panics
    ///
    /// Panics if `pid` is already registered.
    pub fn register_with(&self, pid: ProcessId, role: ProcessRole, termination_expected: bool) {
        let mut processes = self.processes.write();

        if let Some(existing) = processes.get(&pid) {
            panic!(
                "process {} is already registered as {}; duplicate registration as {}",
                pid, existing.role, role
            );
        }

        processes.insert(
            pid,
            Registration {
                role,
                termination_expected,
            },
        );
    }

    /// Record that `pid` is allowed to exit.
    ///
    /// Does nothing when `pid` is not registered, including after it has
    /// been removed.
    pub fn mark_termination_expected(&self, pid: ProcessId) {
        if let Some(registration) = self.processes.write().get_mut(&pid) {
            registration.termination_expected = true;
        }
    }

    /// Mark every monitored child as expected to exit.
    ///
    /// Returns the number of registrations that were flipped.
    pub fn mark_all_termination_expected(&self) -> usize {
        let mut processes = self.processes.write();
        let mut flipped = 0;

        for registration in processes.values_mut() {
            if !registration.termination_expected {
                registration.termination_expected = true;
                flipped += 1;
            }
        }

        flipped
    }

    /// Stop monitoring `pid`, returning its registration if there was one.
    pub fn remove(&self, pid: ProcessId) -> Option<Registration> {
        self.processes.write().remove(&pid)
    }

    /// Look up `pid`, dropping it from the table in the same critical
    /// section when its termination was expected.
    ///
    /// Used once a child's exit has been observed: an expected exit leaves
    /// no entry behind, so a recycled pid can be registered again, while an
    /// unexpected one is kept for the fail-fast path.
    pub fn settle(&self, pid: ProcessId) -> Option<Registration> {
        let mut processes = self.processes.write();
        let registration = processes.get(&pid).copied()?;

        if registration.termination_expected {
            processes.remove(&pid);
        }

        Some(registration)
    }

    /// Look up the registration for `pid`.
    pub fn lookup(&self, pid: ProcessId) -> Option<Registration> {
        self.processes.read().get(&pid).copied()
    }

    /// All monitored pids, in ascending order.
    pub fn monitored(&self) -> Vec<ProcessId> {
        let mut pids: Vec<ProcessId> = self.processes.read().keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    /// Number of monitored children.
    pub fn len(&self) -> usize {
        self.processes.read().len()
    }

    /// Whether no child is monitored.
    pub fn is_empty(&self) -> bool {
        self.processes.read().is_empty()
    }
}
