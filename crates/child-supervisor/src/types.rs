//! Identity and role types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating-system process id of a supervised child.
///
/// Stable for the lifetime of the process and possibly reused by the OS once
/// it has been reaped, which is why waits are bound to the process handle and
/// not to this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(u32);

impl ProcessId {
    /// Wrap a raw pid.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw pid.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for ProcessId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of workload a child process performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessRole {
    /// Produces proofs.
    Prover,

    /// Checks proofs produced elsewhere.
    Verifier,
}

impl ProcessRole {
    /// Human-readable name, as written to logs.
    pub const fn name(self) -> &'static str {
        match self {
            ProcessRole::Prover => "Prover",
            ProcessRole::Verifier => "Verifier",
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(ProcessRole::Prover.to_string(), "Prover");
        assert_eq!(ProcessRole::Verifier.to_string(), "Verifier");
    }

    #[test]
    fn test_process_id_display_and_raw() {
        let pid = ProcessId::from(4242);
        assert_eq!(pid.as_u32(), 4242);
        assert_eq!(pid.to_string(), "4242");
        assert_eq!(pid, ProcessId::new(4242));
    }
}
