use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::watch;

use crate::{
    backend::Backend,
    models::{Identity, LoadingState, SessionUser, SessionView},
    role::Role,
};

/// Session
///
/// Who is logged in, as far as the console knows. Identity, role and the
/// read-only flag only exist once the session resolved to authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// The initial identity check has not answered yet.
    #[default]
    Pending,
    /// Resolved with nobody logged in.
    Anonymous,
    Authenticated(SessionUser),
}

impl Session {
    pub fn loading_state(&self) -> LoadingState {
        match self {
            Self::Pending => LoadingState::Pending,
            Self::Anonymous => LoadingState::Anonymous,
            Self::Authenticated(_) => LoadingState::Authenticated,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    pub fn is_read_only(&self) -> bool {
        self.user().is_some_and(|user| user.is_read_only)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.loading_state(),
            user: self.user().map(|user| user.identity.clone()),
            role: self.role(),
            is_read_only: self.is_read_only(),
        }
    }
}

/// SessionStore
///
/// The single source of truth for the operator's session. It is injected
/// through the application state rather than living in a global, and it is
/// mutated only through `initialize`, `set_session` and `clear`.
///
/// Changes are broadcast over a `watch` channel so anything waiting on the
/// session (guards parked in `checking`) re-evaluates on every transition.
pub struct SessionStore {
    state: watch::Sender<Session>,
    initialize_started: AtomicBool,
}

/// SessionState
///
/// The concrete type used to share the session store across the application.
pub type SessionState = Arc<SessionStore>;

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::Pending);
        Self {
            state,
            initialize_started: AtomicBool::new(false),
        }
    }

    /// initialize
    ///
    /// Runs the one identity check of the process lifetime. Returns `false`
    /// without calling the backend when another caller already started it.
    ///
    /// Any failure resolves the session to anonymous: that is the expected
    /// path for a visitor who has not logged in yet, so it is logged at debug
    /// and nothing else. The answer is only applied while the store is still
    /// pending; a login that landed first wins.
    pub async fn initialize(&self, backend: &dyn Backend) -> bool {
        if self
            .initialize_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("session initialize already started, skipping");
            return false;
        }

        let resolved = match backend.whoami().await {
            Ok(user) => {
                tracing::info!(user_id = %user.identity.id, role = %user.role, "session resolved");
                Session::Authenticated(user)
            }
            Err(e) => {
                tracing::debug!("identity check failed, continuing anonymously: {e}");
                Session::Anonymous
            }
        };

        let applied = self.state.send_if_modified(|current| {
            if current.is_pending() {
                *current = resolved;
                true
            } else {
                false
            }
        });

        if !applied {
            tracing::debug!("identity check answered after the session was already resolved");
        }

        true
    }

    /// set_session
    ///
    /// Mirrors a successful login.
    pub fn set_session(&self, identity: Identity, role: Role, is_read_only: bool) {
        tracing::info!(user_id = %identity.id, %role, is_read_only, "session established");
        self.state.send_replace(Session::Authenticated(SessionUser {
            identity,
            role,
            is_read_only,
        }));
    }

    /// clear
    ///
    /// Mirrors a logout.
    pub fn clear(&self) {
        tracing::info!("session cleared");
        self.state.send_replace(Session::Anonymous);
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// resolved
    ///
    /// Waits until the session has left `Pending` and returns it.
    pub async fn resolved(&self) -> Session {
        let mut receiver = self.state.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot fail here.
        match receiver.wait_for(|session| !session.is_pending()).await {
            Ok(session) => session.clone(),
            Err(_) => self.snapshot(),
        }
    }
}
