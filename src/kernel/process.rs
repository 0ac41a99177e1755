//! Caller identity and capabilities.

use bitflags::bitflags;
use tracing::warn;

use crate::error::{KeymapError, KeymapResult};
use crate::kernel::memory::UserMemory;

bitflags! {
    /// Capabilities a process has promised to restrict itself to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Promises: u32 {
        /// Basic I/O on already open descriptors
        const STDIO = 1 << 0;
        /// Read-only filesystem access
        const RPATH = 1 << 1;
        /// Query the active character map
        const GETKEYMAP = 1 << 2;
        /// Install a character map
        const SETKEYMAP = 1 << 3;
    }
}

/// User and group identity of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Credentials {
    /// Real user id
    pub uid: u32,
    /// Effective user id
    pub euid: u32,
    /// Real group id
    pub gid: u32,
    /// Effective group id
    pub egid: u32,
}

impl Credentials {
    /// Credentials of the superuser.
    #[must_use]
    pub const fn root() -> Self {
        Self::user(0, 0)
    }

    /// Credentials with matching real and effective ids.
    #[must_use]
    pub const fn user(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            euid: uid,
            gid,
            egid: gid,
        }
    }

    /// Checks the effective user id for superuser.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.euid == 0
    }
}

/// Calling process as seen from the privileged side.
///
/// A process that never pledged holds every capability; once pledged it
/// holds exactly the promises it made.
#[derive(Debug, Clone)]
pub struct Process<M> {
    pid: u32,
    credentials: Credentials,
    promises: Option<Promises>,
    memory: M,
}

impl<M: UserMemory> Process<M> {
    /// Creates an unpledged process.
    pub fn new(pid: u32, credentials: Credentials, memory: M) -> Self {
        Self {
            pid,
            credentials,
            promises: None,
            memory,
        }
    }

    /// Restricts the process to `promises`.
    ///
    /// Later pledges can only narrow the set.
    pub fn pledge(&mut self, promises: Promises) {
        self.promises = Some(match self.promises {
            Some(current) => current & promises,
            None => promises,
        });
    }

    /// Process id.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Identity of the process.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Pledged promises, or `None` if the process never pledged.
    #[must_use]
    pub const fn promises(&self) -> Option<Promises> {
        self.promises
    }

    /// Caller memory.
    pub const fn memory(&self) -> &M {
        &self.memory
    }

    /// Caller memory, mutably.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Checks that the process holds `promise`.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the process pledged without it.
    pub fn require_promise(&self, promise: Promises, operation: &'static str) -> KeymapResult<()> {
        match self.promises {
            Some(held) if !held.contains(promise) => {
                warn!(
                    "pid {} attempted {} without the required promise",
                    self.pid, operation
                );
                Err(KeymapError::PermissionDenied {
                    operation,
                    requirement: "pledge promise",
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::memory::AddressSpace;

    #[test]
    fn test_superuser_uses_effective_id() {
        assert!(Credentials::root().is_superuser());
        assert!(!Credentials::user(100, 100).is_superuser());

        let setuid = Credentials {
            uid: 100,
            euid: 0,
            gid: 100,
            egid: 100,
        };
        assert!(setuid.is_superuser());
    }

    #[test]
    fn test_unpledged_process_holds_everything() {
        let process = Process::new(1, Credentials::root(), AddressSpace::new());
        assert!(process.require_promise(Promises::SETKEYMAP, "setkeymap").is_ok());
        assert!(process.require_promise(Promises::GETKEYMAP, "getkeymap").is_ok());
    }

    #[test]
    fn test_pledge_restricts_and_only_narrows() {
        let mut process = Process::new(1, Credentials::root(), AddressSpace::new());
        process.pledge(Promises::STDIO | Promises::GETKEYMAP);
        assert!(process.require_promise(Promises::GETKEYMAP, "getkeymap").is_ok());
        let err = process
            .require_promise(Promises::SETKEYMAP, "setkeymap")
            .unwrap_err();
        assert!(matches!(err, KeymapError::PermissionDenied { .. }));

        process.pledge(Promises::STDIO | Promises::SETKEYMAP);
        assert_eq!(process.promises(), Some(Promises::STDIO));
    }
}
