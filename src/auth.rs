use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};

use crate::{
    backend::Backend,
    error::BackendError,
    guard::{DASHBOARD_PATH, LOGIN_PATH},
    models::{LoginRequest, LoginResponse, NotificationLevel, SessionUser},
    notifications::NotificationCenter,
    routes::normalize,
    session::{Session, SessionState, SessionStore},
};

/// ActiveSession Extractor Result
///
/// The authenticated operator behind a request to the console host's own
/// API (`/api/*`). Handlers take it as an argument to require a session.
#[derive(Debug, Clone)]
pub struct ActiveSession(pub SessionUser);

/// ActiveSession Extractor Implementation
///
/// Reads the process-wide session from the application state. While the
/// initial identity check is still running the extractor waits for it
/// rather than guessing.
///
/// Rejection: `StatusCode::UNAUTHORIZED` (401) when the session resolved
/// anonymous.
impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionState::from_ref(state);

        match session.resolved().await {
            Session::Authenticated(user) => Ok(Self(user)),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

/// login
///
/// Forwards the credentials to the backend and, on success, mirrors the
/// returned principal into the session store. Outcome toasts are queued for
/// the notification area in both cases.
pub async fn login(
    backend: &dyn Backend,
    session: &SessionStore,
    notifications: &NotificationCenter,
    credentials: LoginRequest,
) -> Result<LoginResponse, BackendError> {
    let user = match backend.login(&credentials).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!("login failed: {e}");
            let message = if e.is_rejection() {
                "Invalid email or password."
            } else {
                "Could not reach the server. Please try again."
            };
            notifications.push(NotificationLevel::Error, message);
            return Err(e);
        }
    };

    let greeting = if user.identity.name.is_empty() {
        "Logged in.".to_string()
    } else {
        format!("Welcome back, {}.", user.identity.name)
    };

    session.set_session(user.identity, user.role, user.is_read_only);
    notifications.push(NotificationLevel::Success, greeting);

    Ok(LoginResponse {
        session: session.snapshot().view(),
        redirect_to: redirect_back(credentials.from.as_deref()),
    })
}

/// logout
///
/// Tells the backend, then clears the local session regardless of the
/// answer: an operator who asked to log out is logged out of the console.
pub async fn logout(backend: &dyn Backend, session: &SessionStore, notifications: &NotificationCenter) {
    if let Err(e) = backend.logout().await {
        tracing::warn!("backend logout failed, clearing the local session anyway: {e}");
    }

    session.clear();
    notifications.clear();
    notifications.push(NotificationLevel::Info, "Logged out.");
}

/// redirect_back
///
/// Post-login destination. Only internal console paths are honoured; an
/// absent, external (`//host`, `https://...`) or login path (with any
/// trailing slash or query) falls back to the dashboard.
pub fn redirect_back(from: Option<&str>) -> String {
    match from {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && normalize(path) != LOGIN_PATH =>
        {
            path.to_string()
        }
        _ => DASHBOARD_PATH.to_string(),
    }
}
