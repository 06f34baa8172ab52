// ── Session lifecycle ──
//
// Observable login state. The board decides what a login or logout does
// to the collection; this only tracks who is logged in.

use chrono::Utc;
use tokio::sync::watch;

use crate::model::Session;

pub(crate) struct SessionState {
    current: watch::Sender<Option<Session>>,
}

impl SessionState {
    pub(crate) fn new(initial: Option<Session>) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    /// Start a session for `identity`, replacing any active one.
    pub(crate) fn login(&self, identity: String) -> Session {
        let session = Session {
            identity,
            started_at: Utc::now(),
        };
        self.current.send_replace(Some(session.clone()));
        session
    }

    /// End the active session. Returns the session that ended, if any.
    pub(crate) fn logout(&self) -> Option<Session> {
        self.current.send_replace(None)
    }

    pub(crate) fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}
