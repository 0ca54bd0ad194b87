//! Scoped compute session.
//!
//! A [`Session`] is acquired once and handed to the agent, which owns it for
//! the rest of its life. Dropping the agent, on normal return or while
//! unwinding, releases the session. [`SessionHandle`] lets the caller observe
//! that release without keeping the session alive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

#[derive(Debug)]
pub struct Session {
    name: String,
    active: Arc<AtomicBool>,
}

/// Read-only view of a session's liveness.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    name: String,
    active: Arc<AtomicBool>,
}

impl Session {
    pub fn open(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!("Open session {}", name);
        Session {
            name,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            name: self.name.clone(),
            active: Arc::clone(&self.active),
        }
    }

    /// Release now rather than at end of scope.
    pub fn close(self) {}
}

impl Drop for Session {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        debug!("Release session {}", self.name);
    }
}

impl SessionHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
