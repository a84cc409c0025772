use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Lifecycle of the authenticated session for one page load.
///
/// `Redirecting` is terminal: once entered nothing may transition out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unchecked,
    Checking,
    Authenticated,
    Redirecting,
}

/// Marker returned once the session has been rejected. Holding one means the
/// redirect has already been issued; the only thing left to do is stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session rejected, redirected to {destination}")]
pub struct SessionHalted {
    pub destination: String,
}

/// Performs the actual redirect to the login destination.
pub trait Navigator: Send + Sync {
    fn redirect(&self, destination: &str);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, destination: &str) {
        tracing::warn!(%destination, "redirecting to login");
    }
}

/// Gate shared by every request path. It owns the session state machine and
/// guarantees the navigator is invoked at most once.
pub struct SessionGuard {
    state: Mutex<SessionState>,
    login_destination: String,
    navigator: Arc<dyn Navigator>,
}

impl SessionGuard {
    pub fn new(login_destination: impl Into<String>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            state: Mutex::new(SessionState::Unchecked),
            login_destination: login_destination.into(),
            navigator,
        }
    }

    pub fn login_destination(&self) -> &str {
        &self.login_destination
    }

    pub fn state(&self) -> SessionState {
        *self.lock()
    }

    pub fn is_halted(&self) -> bool {
        self.state() == SessionState::Redirecting
    }

    /// Fails with [`SessionHalted`] once the session has been rejected.
    /// Called before issuing requests and before mutating shared state.
    pub fn ensure_active(&self) -> Result<(), SessionHalted> {
        if self.is_halted() {
            Err(self.halted())
        } else {
            Ok(())
        }
    }

    pub fn begin_check(&self) -> Result<(), SessionHalted> {
        let mut state = self.lock();
        if *state == SessionState::Redirecting {
            return Err(self.halted());
        }
        *state = SessionState::Checking;
        Ok(())
    }

    pub fn mark_authenticated(&self) -> Result<(), SessionHalted> {
        let mut state = self.lock();
        if *state == SessionState::Redirecting {
            return Err(self.halted());
        }
        *state = SessionState::Authenticated;
        Ok(())
    }

    /// Enters the terminal state. The first rejection redirects; later ones
    /// only return the marker.
    pub fn reject(&self, cause: &str) -> SessionHalted {
        let first = {
            let mut state = self.lock();
            let first = *state != SessionState::Redirecting;
            *state = SessionState::Redirecting;
            first
        };

        if first {
            tracing::warn!(%cause, destination = %self.login_destination, "session rejected");
            self.navigator.redirect(&self.login_destination);
        } else {
            tracing::debug!(%cause, "session already redirecting");
        }
        self.halted()
    }

    fn halted(&self) -> SessionHalted {
        SessionHalted {
            destination: self.login_destination.clone(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("state", &self.state())
            .field("login_destination", &self.login_destination)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub(crate) struct CountingNavigator {
        pub(crate) redirects: AtomicUsize,
    }

    impl Navigator for CountingNavigator {
        fn redirect(&self, _destination: &str) {
            self.redirects.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_state_machine_happy_path() {
        let guard = SessionGuard::new("/login.html", Arc::new(LogNavigator));
        assert_eq!(guard.state(), SessionState::Unchecked);
        guard.begin_check().unwrap();
        assert_eq!(guard.state(), SessionState::Checking);
        guard.mark_authenticated().unwrap();
        assert_eq!(guard.state(), SessionState::Authenticated);
        assert!(guard.ensure_active().is_ok());
    }

    #[test]
    fn test_reject_is_terminal_and_redirects_once() {
        let navigator = Arc::new(CountingNavigator::default());
        let guard = SessionGuard::new("/login.html", navigator.clone());

        let halted = guard.reject("budget");
        assert_eq!(halted.destination, "/login.html");
        guard.reject("goals");
        guard.reject("subscriptions");

        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
        assert_eq!(guard.state(), SessionState::Redirecting);
        assert!(guard.begin_check().is_err());
        assert!(guard.mark_authenticated().is_err());
        assert_eq!(guard.state(), SessionState::Redirecting);
        assert!(guard.ensure_active().is_err());
    }
}
