use std::cell::RefCell;
use std::rc::Rc;

use super::action::Action;
use super::error::SessionError;
use super::gate::{Phase, RebootGate};
use super::services::ports::Toolkit;
use super::session::{DispatchResult, SessionManager};

/// Cloneable entry point the UI glue dispatches through.
///
/// Requests arriving while a reboot runs are turned away through the shared
/// gate without touching the manager; any other nested request is reported as
/// [`SessionError::Busy`].
pub struct SessionHandle<T: Toolkit> {
    inner: Rc<RefCell<SessionManager<T>>>,
    gate: RebootGate,
}

impl<T: Toolkit> Clone for SessionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            gate: self.gate.clone(),
        }
    }
}

impl<T: Toolkit> SessionHandle<T> {
    pub fn new(manager: SessionManager<T>) -> Self {
        let gate = manager.gate();
        Self {
            inner: Rc::new(RefCell::new(manager)),
            gate,
        }
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    pub fn dispatch(&self, action: Action) -> Result<DispatchResult, SessionError> {
        self.gate.check()?;
        let mut manager = self.inner.try_borrow_mut().map_err(|_| SessionError::Busy)?;
        manager.dispatch(action)
    }

    pub fn with<R>(&self, f: impl FnOnce(&SessionManager<T>) -> R) -> Result<R, SessionError> {
        let manager = self.inner.try_borrow().map_err(|_| SessionError::Busy)?;
        Ok(f(&manager))
    }

    pub fn with_mut<R>(
        &self,
        f: impl FnOnce(&mut SessionManager<T>) -> R,
    ) -> Result<R, SessionError> {
        let mut manager = self.inner.try_borrow_mut().map_err(|_| SessionError::Busy)?;
        Ok(f(&mut manager))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/handle.rs"]
mod tests;
