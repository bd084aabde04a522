use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::Semaphore;

use crate::{
    error::BackendError,
    models::{LoginRequest, SessionUser, SuperAdminCheck, UserEnvelope},
};

/// Identity-check ("whoami") endpoint.
pub const WHOAMI_PATH: &str = "/protected";
/// Dedicated privilege check used by the super-admin guard.
pub const SUPER_ADMIN_CHECK_PATH: &str = "/super-admin-check";
pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Backend Trait
///
/// The four REST contracts the access-control core consumes. Bodies are the
/// backend's concern; this trait only exposes what the session store and the
/// guards need out of them.
///
/// **Send + Sync + async_trait** keep `Arc<dyn Backend>` usable from spawned
/// tasks (the super-admin check runs detached from the navigation that
/// started it).
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolves the principal behind the ambient session cookie.
    async fn whoami(&self) -> Result<SessionUser, BackendError>;
    /// Asks the backend whether the current session holds super-admin rights.
    async fn super_admin_check(&self) -> Result<bool, BackendError>;
    async fn login(&self, credentials: &LoginRequest) -> Result<SessionUser, BackendError>;
    async fn logout(&self) -> Result<(), BackendError>;
}

/// BackendState
///
/// The shared handle stored in the application state.
pub type BackendState = Arc<dyn Backend>;

/// HttpBackend
///
/// reqwest-backed implementation. The client keeps a cookie jar, so the
/// session cookie set by `POST /auth/login` is replayed on every later call;
/// the console never touches tokens itself.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds a client against `base_url` (no trailing slash required).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads a `{ "user": ... }` body, rejecting non-2xx answers first.
    async fn read_user(response: reqwest::Response) -> Result<SessionUser, BackendError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let envelope = response
            .json::<UserEnvelope>()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        Ok(envelope.user.into())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn whoami(&self) -> Result<SessionUser, BackendError> {
        let response = self.client.get(self.url(WHOAMI_PATH)).send().await?;
        Self::read_user(response).await
    }

    /// Only an explicit `true` in a 2xx body confirms. Everything else,
    /// including an unparseable 2xx body, is a refusal.
    async fn super_admin_check(&self) -> Result<bool, BackendError> {
        let response = self
            .client
            .get(self.url(SUPER_ADMIN_CHECK_PATH))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let check = response
            .json::<SuperAdminCheck>()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        Ok(check.is_super_admin)
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<SessionUser, BackendError> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        Self::read_user(response).await
    }

    async fn logout(&self) -> Result<(), BackendError> {
        let response = self.client.post(self.url(LOGOUT_PATH)).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(BackendError::Status(status)),
        }
    }
}

// The Mock Implementation (For Tests)

/// MockVerdict
///
/// What the mock answers to `super_admin_check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockVerdict {
    Confirmed,
    #[default]
    Refused,
    NetworkError,
}

/// MockBackend
///
/// In-process `Backend` used by the unit and integration tests. Each endpoint
/// can be held behind a gate so tests control exactly when an in-flight call
/// resolves (used to exercise pending states and stale responses).
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Returned by `whoami`; `None` simulates an anonymous visitor (401).
    pub whoami_user: Option<SessionUser>,
    /// Returned by `login`; `None` simulates rejected credentials (401).
    pub login_user: Option<SessionUser>,
    pub super_admin: MockVerdict,
    /// When true, `logout` fails with a simulated outage.
    pub fail_logout: bool,
    whoami_gate: Option<Arc<Semaphore>>,
    super_admin_gate: Option<Arc<Semaphore>>,
    calls: Arc<MockCalls>,
}

#[derive(Default)]
struct MockCalls {
    whoami: AtomicUsize,
    super_admin_check: AtomicUsize,
    login: AtomicUsize,
    logout: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose identity check succeeds with `user`.
    pub fn authenticated(user: SessionUser) -> Self {
        Self {
            whoami_user: Some(user.clone()),
            login_user: Some(user),
            ..Self::default()
        }
    }

    pub fn with_super_admin(mut self, verdict: MockVerdict) -> Self {
        self.super_admin = verdict;
        self
    }

    /// Holds every `whoami` call until `release_whoami` is called.
    pub fn gate_whoami(mut self) -> Self {
        self.whoami_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Holds every `super_admin_check` call until `release_super_admin_check`.
    pub fn gate_super_admin_check(mut self) -> Self {
        self.super_admin_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn release_whoami(&self) {
        if let Some(gate) = &self.whoami_gate {
            gate.add_permits(1);
        }
    }

    pub fn release_super_admin_check(&self) {
        if let Some(gate) = &self.super_admin_gate {
            gate.add_permits(1);
        }
    }

    pub fn whoami_calls(&self) -> usize {
        self.calls.whoami.load(Ordering::SeqCst)
    }

    pub fn super_admin_calls(&self) -> usize {
        self.calls.super_admin_check.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.calls.login.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.calls.logout.load(Ordering::SeqCst)
    }

    async fn pass(gate: &Option<Arc<Semaphore>>) {
        if let Some(gate) = gate {
            // A closed semaphore is never produced by the mock; treat it as open.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn whoami(&self) -> Result<SessionUser, BackendError> {
        self.calls.whoami.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.whoami_gate).await;

        self.whoami_user
            .clone()
            .ok_or(BackendError::Status(StatusCode::UNAUTHORIZED))
    }

    async fn super_admin_check(&self) -> Result<bool, BackendError> {
        self.calls.super_admin_check.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.super_admin_gate).await;

        match self.super_admin {
            MockVerdict::Confirmed => Ok(true),
            MockVerdict::Refused => Err(BackendError::Status(StatusCode::FORBIDDEN)),
            MockVerdict::NetworkError => Err(BackendError::Unavailable),
        }
    }

    async fn login(&self, _credentials: &LoginRequest) -> Result<SessionUser, BackendError> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);

        self.login_user
            .clone()
            .ok_or(BackendError::Status(StatusCode::UNAUTHORIZED))
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.calls.logout.fetch_add(1, Ordering::SeqCst);

        if self.fail_logout {
            Err(BackendError::Unavailable)
        } else {
            Ok(())
        }
    }
}
