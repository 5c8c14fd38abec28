use std::cell::Cell;
use std::rc::Rc;

use super::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Running,
    Rebooting,
    /// Final save done; the session accepts no more requests.
    Unloaded,
}

/// Lifecycle phase shared between the manager and every handle onto it.
///
/// Handles read it without borrowing the manager, which is what lets a nested
/// caller observe an ongoing reboot.
#[derive(Debug, Clone, Default)]
pub struct RebootGate {
    phase: Rc<Cell<Phase>>,
}

impl RebootGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn check(&self) -> Result<(), SessionError> {
        match self.phase.get() {
            Phase::Running => Ok(()),
            Phase::Rebooting => Err(SessionError::RebootInProgress),
            Phase::Unloaded => Err(SessionError::Unloaded),
        }
    }

    /// Moves to `Rebooting` until the returned guard is dropped.
    pub fn enter(&self) -> Result<RebootGuard, SessionError> {
        self.check()?;
        self.phase.set(Phase::Rebooting);
        Ok(RebootGuard {
            phase: Rc::clone(&self.phase),
        })
    }

    pub(crate) fn close(&self) {
        self.phase.set(Phase::Unloaded);
    }
}

#[must_use = "the gate reopens as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RebootGuard {
    phase: Rc<Cell<Phase>>,
}

impl Drop for RebootGuard {
    fn drop(&mut self) {
        if self.phase.get() == Phase::Rebooting {
            self.phase.set(Phase::Running);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/gate.rs"]
mod tests;
