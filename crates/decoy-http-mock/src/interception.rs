//! Process-wide installation of a transport and scoped activation.
//!
//! The slot here is the redesigned seam for clients wired to a process
//! default transport instead of receiving one by injection. Exactly one
//! session may be active at a time; tests that prefer full isolation can
//! skip this module entirely and pass a [`MockTransport`] around directly.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::info;

use crate::error::ActivationError;
use crate::transport::{MockTransport, Transport};

static INSTALLED: Lazy<Mutex<Option<Arc<dyn Transport>>>> = Lazy::new(|| Mutex::new(None));

/// Transport currently installed as the process default, if any. Client
/// plumbing consults this instead of opening a real connection.
pub fn installed() -> Option<Arc<dyn Transport>> {
    INSTALLED.lock().clone()
}

fn install(transport: Arc<dyn Transport>) -> Result<(), ActivationError> {
    let mut slot = INSTALLED.lock();
    if slot.is_some() {
        return Err(ActivationError::AlreadyActive);
    }
    *slot = Some(transport);
    info!("mock transport installed");
    Ok(())
}

fn uninstall() {
    if INSTALLED.lock().take().is_some() {
        info!("mock transport removed");
    }
}

impl MockTransport {
    /// Install this mock as the process default transport.
    ///
    /// Fails if any session is already active; reentrant activation is a
    /// usage error, never recovered from here.
    pub fn start(&self) -> Result<(), ActivationError> {
        install(Arc::new(self.clone()))
    }

    /// Remove the installed transport, restoring the empty default. Does
    /// not reset rules or recorded calls; pair with [`MockTransport::reset`]
    /// or use [`MockTransport::activate`].
    pub fn stop(&self) {
        uninstall();
    }

    /// Scoped activation: the returned guard stops the session and resets
    /// rules and call log when dropped, on every exit path including panics.
    pub fn activate(&self) -> Result<ActivationGuard, ActivationError> {
        self.start()?;
        Ok(ActivationGuard {
            session: self.clone(),
        })
    }

    /// Run `f` with this mock active, then stop and reset.
    ///
    /// # Panics
    ///
    /// Panics if a session is already active.
    pub fn intercept<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = match self.activate() {
            Ok(guard) => guard,
            Err(err) => panic!("{err}"),
        };
        f()
    }
}

/// Keeps a mock session installed for a scope; `Drop` runs stop + reset so
/// rules and recorded calls never leak into the next test.
#[must_use = "dropping the guard immediately deactivates the mock"]
pub struct ActivationGuard {
    session: MockTransport,
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        self.session.stop();
        self.session.reset();
    }
}
