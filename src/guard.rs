//! Route guards.
//!
//! Every authenticated console path sits behind the authentication guard,
//! with at most one role or super-admin [`Guard`] nested inside it. The
//! authentication and role guards decide from the cached [`Session`] alone;
//! the super-admin guard is the named exception that re-verifies against the
//! backend on every mount (see [`crate::super_admin`]).

use serde::Serialize;

use crate::{role::Role, session::Session};

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/login";
/// Landing page, and the hardcoded target of read-only denials.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Where a failed super-admin verification ends up.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Path prefixes a read-only operator may open under an "any role" guard.
pub const READ_ONLY_PREFIXES: [&str; 4] =
    ["/dashboard", "/campaigns", "/campaign-results", "/settings"];

/// GuardState
///
/// Outcome of one guard evaluation for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GuardState {
    /// Waiting on the session (or on the super-admin check). Render a
    /// neutral loading indicator and do not redirect.
    Checking,
    DeniedRedirect(Redirect),
    Allowed,
}

impl GuardState {
    /// Wire tags used in navigation responses.
    pub const CHECKING: &'static str = "checking";
    pub const DENIED_REDIRECT: &'static str = "denied-redirect";
    pub const ALLOWED: &'static str = "allowed";

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => Self::CHECKING,
            Self::DeniedRedirect(_) => Self::DENIED_REDIRECT,
            Self::Allowed => Self::ALLOWED,
        }
    }
}

/// Redirect
///
/// A navigation decision away from the requested path. `from` carries the
/// originally requested path when the visitor should be brought back after
/// logging in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    pub from: Option<String>,
}

impl Redirect {
    pub fn to(path: &str) -> Self {
        Self {
            to: path.to_string(),
            from: None,
        }
    }

    pub fn with_from(path: &str, from: &str) -> Self {
        Self {
            to: path.to_string(),
            from: Some(from.to_string()),
        }
    }
}

/// Guard
///
/// The three guard variants of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Any authenticated session may pass.
    Authenticated { fallback: String },
    /// Role allow-list. An empty list means "any authenticated role", in
    /// which case read-only sessions are confined to [`READ_ONLY_PREFIXES`].
    Roles { allowed: Vec<Role>, fallback: String },
    /// Backend-verified super-admin access.
    SuperAdmin,
}

impl Guard {
    /// Authentication guard redirecting anonymous visitors to the login page.
    pub fn authenticated() -> Self {
        Self::Authenticated {
            fallback: LOGIN_PATH.to_string(),
        }
    }

    pub fn roles(allowed: &[Role], fallback: &str) -> Self {
        Self::Roles {
            allowed: allowed.to_vec(),
            fallback: fallback.to_string(),
        }
    }

    /// "Any authenticated role" guard.
    pub fn any_role(fallback: &str) -> Self {
        Self::roles(&[], fallback)
    }

    pub fn super_admin() -> Self {
        Self::SuperAdmin
    }

    /// The caller-supplied fallback, if this variant has one.
    pub fn fallback(&self) -> Option<&str> {
        match self {
            Self::Authenticated { fallback } | Self::Roles { fallback, .. } => Some(fallback),
            Self::SuperAdmin => None,
        }
    }

    /// True for the one variant whose decision needs a network round-trip.
    pub fn requires_verification(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// evaluate
    ///
    /// Pure decision for `requested_path` under `session`. Calling it twice
    /// with the same inputs yields the same answer.
    ///
    /// Order matters: pending first, then anonymous, then the variant rules.
    /// For [`Guard::SuperAdmin`] an authenticated session still yields
    /// `Checking`: the verdict belongs to a mounted
    /// [`crate::super_admin::SuperAdminGuard`].
    pub fn evaluate(&self, session: &Session, requested_path: &str) -> GuardState {
        let user = match session {
            Session::Pending => return GuardState::Checking,
            Session::Anonymous => {
                let target = match self {
                    Self::Authenticated { fallback } | Self::Roles { fallback, .. } => {
                        fallback.as_str()
                    }
                    Self::SuperAdmin => LOGIN_PATH,
                };
                return GuardState::DeniedRedirect(Redirect::with_from(target, requested_path));
            }
            Session::Authenticated(user) => user,
        };

        match self {
            Self::Authenticated { .. } => GuardState::Allowed,

            // Role-scoped routes ignore the read-only flag entirely.
            Self::Roles { allowed, fallback } if !allowed.is_empty() => {
                if allowed.contains(&user.role) {
                    GuardState::Allowed
                } else {
                    tracing::debug!(role = %user.role, path = requested_path, "role not in allow-list");
                    GuardState::DeniedRedirect(Redirect::to(fallback))
                }
            }

            // The read-only denial goes to the dashboard, not to `fallback`.
            Self::Roles { .. } => {
                if !user.is_read_only || read_only_may_open(requested_path) {
                    GuardState::Allowed
                } else {
                    tracing::debug!(path = requested_path, "read-only session outside allow-list");
                    GuardState::DeniedRedirect(Redirect::to(DASHBOARD_PATH))
                }
            }

            Self::SuperAdmin => GuardState::Checking,
        }
    }
}

/// True when a read-only session may open `path` under an "any role" guard.
///
/// Plain prefix match: `/settings-archive` passes as well as `/settings/smtp`.
pub fn read_only_may_open(path: &str) -> bool {
    READ_ONLY_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}
