//! Navigation: path table + session + guards → one decision.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    backend::BackendState,
    guard::{GuardState, Redirect},
    routes::{Access, Page, RouteTable, normalize},
    session::{Session, SessionState},
    super_admin::SuperAdminGuard,
};

/// Navigation
///
/// What the view layer should do for a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the loading indicator; nothing is decided yet.
    Loading,
    Redirect(Redirect),
    Render {
        page: Page,
        params: BTreeMap<String, String>,
        /// Authenticated pages render inside the page frame; public ones don't.
        framed: bool,
    },
    NotFound,
}

impl Navigation {
    /// The guard-state tag reported to the view layer.
    pub fn state(&self) -> &'static str {
        match self {
            Self::Loading => GuardState::CHECKING,
            Self::Redirect(_) => GuardState::DENIED_REDIRECT,
            Self::Render { .. } => GuardState::ALLOWED,
            Self::NotFound => "not-found",
        }
    }
}

/// Navigator
///
/// Evaluates navigation attempts. Holds only shared handles, so it is cheap
/// to clone into handlers.
#[derive(Clone)]
pub struct Navigator {
    table: Arc<RouteTable>,
    session: SessionState,
    backend: BackendState,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, session: SessionState, backend: BackendState) -> Self {
        Self {
            table,
            session,
            backend,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// evaluate
    ///
    /// Non-blocking decision against the current session snapshot. Routes
    /// behind the super-admin guard report `Loading` for an authenticated
    /// session: their verdict needs a mounted guard (see `navigate`).
    pub fn evaluate(&self, path: &str) -> Navigation {
        self.decide(&self.session.snapshot(), path)
    }

    /// navigate
    ///
    /// Full navigation: waits for a pending session to resolve, then, for the
    /// super-admin subtree, mounts a fresh guard and waits for the backend
    /// verdict. Dropping the returned future drops the mount, so a late
    /// verdict is discarded.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let mut decision = self.evaluate(path);

        // Public paths and forwards are decided without the session.
        if decision == Navigation::Loading {
            let session = self.session.resolved().await;
            decision = self.decide(&session, path);
        }

        if decision != Navigation::Loading {
            return decision;
        }

        let Some(route) = self.table.resolve(path) else {
            return Navigation::NotFound;
        };
        let Some(page) = route.entry.page else {
            return Navigation::NotFound;
        };

        let guard = SuperAdminGuard::mount(Arc::clone(&self.backend));
        match guard.settled().await {
            GuardState::Allowed => Navigation::Render {
                page,
                params: route.params,
                framed: true,
            },
            GuardState::DeniedRedirect(redirect) => Navigation::Redirect(redirect),
            GuardState::Checking => Navigation::Loading,
        }
    }

    fn decide(&self, session: &Session, path: &str) -> Navigation {
        let requested = normalize(path);
        let Some(route) = self.table.resolve(&requested) else {
            tracing::debug!(path = %requested, "no console route");
            return Navigation::NotFound;
        };

        match &route.entry.access {
            Access::Forward(target) => Navigation::Redirect(Redirect::to(target)),
            Access::Public => match route.entry.page {
                Some(page) => Navigation::Render {
                    page,
                    params: route.params,
                    framed: false,
                },
                None => Navigation::NotFound,
            },
            Access::Guarded(_) => {
                let state = route.entry.evaluate(session, &requested);
                match (state, route.entry.page) {
                    (GuardState::Checking, _) => Navigation::Loading,
                    (GuardState::DeniedRedirect(redirect), _) => Navigation::Redirect(redirect),
                    (GuardState::Allowed, Some(page)) => Navigation::Render {
                        page,
                        params: route.params,
                        framed: true,
                    },
                    (GuardState::Allowed, None) => Navigation::NotFound,
                }
            }
        }
    }
}
