use phishsim_console::{
    MockBackend, Session, SessionStore,
    models::{Identity, LoadingState, SessionUser},
    role::Role,
};
use std::{sync::Arc, time::Duration};

fn operator(role: Role, is_read_only: bool) -> SessionUser {
    SessionUser {
        identity: Identity {
            id: "42".to_string(),
            name: "Robin".to_string(),
            email: "robin@example.com".to_string(),
        },
        role,
        is_read_only,
    }
}

#[tokio::test]
async fn test_store_starts_pending() {
    let store = SessionStore::new();
    assert_eq!(store.snapshot(), Session::Pending);
    assert_eq!(store.snapshot().loading_state(), LoadingState::Pending);
}

#[tokio::test]
async fn test_initialize_success_resolves_authenticated() {
    let store = SessionStore::new();
    let backend = MockBackend::authenticated(operator(Role::Editor, true));

    assert!(store.initialize(&backend).await);

    let session = store.snapshot();
    assert_eq!(session.loading_state(), LoadingState::Authenticated);
    assert_eq!(session.role(), Some(Role::Editor));
    assert!(session.is_read_only());
    assert_eq!(session.user().unwrap().identity.email, "robin@example.com");
}

#[tokio::test]
async fn test_initialize_failure_resolves_anonymous() {
    let store = SessionStore::new();
    let backend = MockBackend::new();

    assert!(store.initialize(&backend).await);
    assert_eq!(store.snapshot(), Session::Anonymous);
    assert!(store.snapshot().user().is_none());
}

#[tokio::test]
async fn test_initialize_runs_once() {
    let store = SessionStore::new();
    let backend = MockBackend::authenticated(operator(Role::User, false));

    assert!(store.initialize(&backend).await);
    assert!(!store.initialize(&backend).await);
    assert_eq!(backend.whoami_calls(), 1);
}

#[tokio::test]
async fn test_concurrent_initialize_issues_one_identity_check() {
    let store = Arc::new(SessionStore::new());
    let backend = MockBackend::authenticated(operator(Role::User, false)).gate_whoami();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let backend = backend.clone();
            tokio::spawn(async move { store.initialize(&backend).await })
        })
        .collect();

    // Give every task the chance to reach the store before releasing the call.
    tokio::time::sleep(Duration::from_millis(20)).await;
    backend.release_whoami();

    let mut started = 0;
    for handle in handles {
        if handle.await.unwrap() {
            started += 1;
        }
    }

    assert_eq!(started, 1);
    assert_eq!(backend.whoami_calls(), 1);
    assert_eq!(store.snapshot().loading_state(), LoadingState::Authenticated);
}

#[tokio::test]
async fn test_login_before_slow_identity_check_wins() {
    let store = Arc::new(SessionStore::new());
    // The identity check will say "anonymous", but only after the login.
    let backend = MockBackend::new().gate_whoami();

    let init = {
        let store = Arc::clone(&store);
        let backend = backend.clone();
        tokio::spawn(async move { store.initialize(&backend).await })
    };

    let principal = operator(Role::Admin, false);
    store.set_session(principal.identity.clone(), principal.role, principal.is_read_only);

    backend.release_whoami();
    assert!(init.await.unwrap());

    assert_eq!(store.snapshot(), Session::Authenticated(principal));
}

#[tokio::test]
async fn test_set_session_and_clear() {
    let store = SessionStore::new();
    let principal = operator(Role::SuperAdmin, false);

    store.set_session(principal.identity.clone(), principal.role, false);
    assert_eq!(store.snapshot().role(), Some(Role::SuperAdmin));

    store.clear();
    assert_eq!(store.snapshot(), Session::Anonymous);
    assert_eq!(store.snapshot().view().user, None);
}

#[tokio::test]
async fn test_resolved_waits_for_initialize() {
    let store = Arc::new(SessionStore::new());
    let backend = MockBackend::authenticated(operator(Role::User, false)).gate_whoami();

    let waiter = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.resolved().await })
    };
    let init = {
        let store = Arc::clone(&store);
        let backend = backend.clone();
        tokio::spawn(async move { store.initialize(&backend).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    backend.release_whoami();
    init.await.unwrap();

    let session = waiter.await.unwrap();
    assert_eq!(session.loading_state(), LoadingState::Authenticated);
}

#[tokio::test]
async fn test_subscribers_see_every_transition() {
    let store = SessionStore::new();
    let mut receiver = store.subscribe();

    store.clear();
    receiver.changed().await.unwrap();
    assert_eq!(*receiver.borrow_and_update(), Session::Anonymous);

    let principal = operator(Role::User, true);
    store.set_session(principal.identity.clone(), principal.role, true);
    receiver.changed().await.unwrap();
    assert!(receiver.borrow_and_update().is_read_only());
}

#[tokio::test]
async fn test_session_view_projection() {
    let view = Session::Pending.view();
    assert_eq!(view.state, LoadingState::Pending);
    assert_eq!(view.role, None);
    assert!(!view.is_read_only);

    let view = Session::Authenticated(operator(Role::Admin, true)).view();
    assert_eq!(view.state, LoadingState::Authenticated);
    assert_eq!(view.role, Some(Role::Admin));
    assert!(view.is_read_only);
    assert_eq!(view.user.unwrap().name, "Robin");
}
