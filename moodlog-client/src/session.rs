use std::sync::Arc;
use tokio::sync::watch;

/// Login state as far as the client knows. Starts out as `Unknown` until the first session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    pub fn from_logged_in(logged_in: bool) -> Self {
        if logged_in {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Shared handle on the login state, handed to every route.
#[derive(Clone)]
pub struct Session {
    status: Arc<watch::Sender<SessionStatus>>,
}

impl Default for Session {
    fn default() -> Self {
        let (status, _) = watch::channel(SessionStatus::Unknown);
        Self {
            status: Arc::new(status),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub fn set(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_unknown_until_set() {
        let session = Session::new();
        let rx = session.subscribe();
        assert_eq!(session.status(), SessionStatus::Unknown);

        session.set(SessionStatus::from_logged_in(true));
        assert_eq!(*rx.borrow(), SessionStatus::Authenticated);
        assert!(session.status().is_logged_in());
    }
}
