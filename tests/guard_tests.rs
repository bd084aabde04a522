use phishsim_console::{
    MockBackend, Navigation, Navigator, RouteTable, Session, SessionStore,
    backend::BackendState,
    guard::{DASHBOARD_PATH, Guard, GuardState, LOGIN_PATH, Redirect, read_only_may_open},
    models::{Identity, SessionUser},
    role::Role,
    routes::Page,
};
use std::sync::Arc;

// --- Helper Functions ---

fn user(role: Role, is_read_only: bool) -> SessionUser {
    SessionUser {
        identity: Identity {
            id: "u-1".to_string(),
            name: "Dana Operator".to_string(),
            email: "dana@example.com".to_string(),
        },
        role,
        is_read_only,
    }
}

fn signed_in(role: Role, is_read_only: bool) -> Session {
    Session::Authenticated(user(role, is_read_only))
}

fn admins_guard() -> Guard {
    Guard::roles(&[Role::Admin, Role::SuperAdmin], DASHBOARD_PATH)
}

/// Navigator whose session store is driven directly by the test.
fn navigator() -> (Navigator, Arc<SessionStore>) {
    let session = Arc::new(SessionStore::new());
    let backend = Arc::new(MockBackend::new()) as BackendState;
    let table = Arc::new(RouteTable::console().unwrap());
    (Navigator::new(table, Arc::clone(&session), backend), session)
}

fn sign_in(session: &SessionStore, role: Role, is_read_only: bool) {
    let principal = user(role, is_read_only);
    session.set_session(principal.identity, principal.role, principal.is_read_only);
}

// --- Guard::evaluate ---

#[test]
fn test_authentication_guard_is_idempotent() {
    let guard = Guard::authenticated();

    for session in [
        Session::Pending,
        Session::Anonymous,
        signed_in(Role::User, false),
        signed_in(Role::Editor, true),
    ] {
        let first = guard.evaluate(&session, "/profile");
        let second = guard.evaluate(&session, "/profile");
        assert_eq!(first, second);
    }
}

#[test]
fn test_pending_session_only_ever_checks() {
    let guards = [
        Guard::authenticated(),
        Guard::any_role(DASHBOARD_PATH),
        admins_guard(),
        Guard::super_admin(),
    ];

    for guard in &guards {
        for path in ["/dashboard", "/templates", "/database", "/super-admin"] {
            assert_eq!(guard.evaluate(&Session::Pending, path), GuardState::Checking);
        }
    }
}

#[test]
fn test_anonymous_redirects_to_fallback_with_requested_path() {
    let state = Guard::authenticated().evaluate(&Session::Anonymous, "/profile");
    assert_eq!(
        state,
        GuardState::DeniedRedirect(Redirect::with_from(LOGIN_PATH, "/profile"))
    );

    // Role guards send anonymous visitors to the caller-supplied fallback.
    let state = Guard::roles(&[Role::Admin], LOGIN_PATH).evaluate(&Session::Anonymous, "/database");
    assert_eq!(
        state,
        GuardState::DeniedRedirect(Redirect::with_from(LOGIN_PATH, "/database"))
    );
}

#[test]
fn test_role_carve_out_ignores_read_only() {
    let session = signed_in(Role::Admin, true);
    assert_eq!(
        admins_guard().evaluate(&session, "/database"),
        GuardState::Allowed
    );
}

#[test]
fn test_role_outside_allow_list_goes_to_fallback() {
    let session = signed_in(Role::Editor, false);
    assert_eq!(
        admins_guard().evaluate(&session, "/audit-logs"),
        GuardState::DeniedRedirect(Redirect::to(DASHBOARD_PATH))
    );
}

#[test]
fn test_read_only_restriction_under_any_role_guard() {
    let guard = Guard::any_role(DASHBOARD_PATH);
    let session = signed_in(Role::User, true);

    assert_eq!(
        guard.evaluate(&session, "/templates"),
        GuardState::DeniedRedirect(Redirect::to(DASHBOARD_PATH))
    );
    assert_eq!(guard.evaluate(&session, "/campaigns"), GuardState::Allowed);
    assert_eq!(guard.evaluate(&session, "/campaigns/42"), GuardState::Allowed);
    assert_eq!(guard.evaluate(&session, "/campaign-results/42"), GuardState::Allowed);
    assert_eq!(guard.evaluate(&session, "/settings"), GuardState::Allowed);
}

#[test]
fn test_read_only_denial_ignores_caller_fallback() {
    // The caller asks for /settings, the denial still lands on the dashboard.
    let guard = Guard::any_role("/settings");
    let session = signed_in(Role::Editor, true);

    assert_eq!(
        guard.evaluate(&session, "/groups"),
        GuardState::DeniedRedirect(Redirect::to(DASHBOARD_PATH))
    );
}

#[test]
fn test_authentication_guard_admits_read_only_everywhere() {
    let session = signed_in(Role::User, true);
    assert_eq!(
        Guard::authenticated().evaluate(&session, "/profile"),
        GuardState::Allowed
    );
}

#[test]
fn test_super_admin_guard_never_decides_from_cached_role() {
    // Even a cached superadmin role needs the backend's confirmation.
    let session = signed_in(Role::SuperAdmin, false);
    assert_eq!(
        Guard::super_admin().evaluate(&session, "/super-admin"),
        GuardState::Checking
    );
    assert!(Guard::super_admin().requires_verification());
}

#[test]
fn test_read_only_prefixes() {
    assert!(read_only_may_open("/dashboard"));
    assert!(read_only_may_open("/settings/profile"));
    assert!(!read_only_may_open("/landing-pages"));
    assert!(!read_only_may_open("/"));
}

// --- Navigator::evaluate (end-to-end scenarios) ---

#[test]
fn test_scenario_anonymous_campaigns_goes_to_login() {
    let (navigator, session) = navigator();
    session.clear();

    assert_eq!(
        navigator.evaluate("/campaigns"),
        Navigation::Redirect(Redirect::with_from(LOGIN_PATH, "/campaigns"))
    );
}

#[test]
fn test_anonymous_dashboard_goes_to_login_not_itself() {
    let (navigator, session) = navigator();
    session.clear();

    assert_eq!(
        navigator.evaluate("/dashboard"),
        Navigation::Redirect(Redirect::with_from(LOGIN_PATH, "/dashboard"))
    );
}

#[test]
fn test_anonymous_admin_page_goes_to_login_with_from() {
    let (navigator, session) = navigator();
    session.clear();

    for path in ["/user-management", "/templates/4", "/super-admin/licenses"] {
        assert_eq!(
            navigator.evaluate(path),
            Navigation::Redirect(Redirect::with_from(LOGIN_PATH, path)),
            "{path}"
        );
    }
}

#[test]
fn test_navigation_state_tags_match_guard_states() {
    let redirect = Redirect::to(DASHBOARD_PATH);

    assert_eq!(
        Navigation::Redirect(redirect.clone()).state(),
        GuardState::DeniedRedirect(redirect).as_str()
    );
    assert_eq!(Navigation::Loading.state(), GuardState::Checking.as_str());
    assert_eq!(Navigation::NotFound.state(), "not-found");
}

#[test]
fn test_scenario_editor_opens_landing_pages() {
    let (navigator, session) = navigator();
    sign_in(&session, Role::Editor, false);

    match navigator.evaluate("/landing-pages") {
        Navigation::Render { page, framed, .. } => {
            assert_eq!(page, Page::LandingPages);
            assert!(framed);
        }
        other => panic!("expected render, got {other:?}"),
    }
}

#[test]
fn test_scenario_user_bounced_from_user_management() {
    let (navigator, session) = navigator();
    sign_in(&session, Role::User, false);

    assert_eq!(
        navigator.evaluate("/user-management"),
        Navigation::Redirect(Redirect::to(DASHBOARD_PATH))
    );
}

#[test]
fn test_pending_navigation_is_loading_not_redirect() {
    let (navigator, _session) = navigator();

    assert_eq!(navigator.evaluate("/campaigns"), Navigation::Loading);
    assert_eq!(navigator.evaluate("/user-management"), Navigation::Loading);
}

#[test]
fn test_public_paths_render_without_session() {
    let (navigator, _session) = navigator();

    // Still pending: public pages do not wait on the session at all.
    match navigator.evaluate("/quiz/abc123") {
        Navigation::Render {
            page,
            params,
            framed,
        } => {
            assert_eq!(page, Page::PublicQuiz);
            assert_eq!(params.get("token").map(String::as_str), Some("abc123"));
            assert!(!framed);
        }
        other => panic!("expected render, got {other:?}"),
    }
}

#[test]
fn test_guard_reevaluates_after_session_change() {
    let (navigator, session) = navigator();
    sign_in(&session, Role::User, true);
    assert_eq!(
        navigator.evaluate("/templates"),
        Navigation::Redirect(Redirect::to(DASHBOARD_PATH))
    );

    sign_in(&session, Role::Editor, false);
    assert!(matches!(
        navigator.evaluate("/templates"),
        Navigation::Render {
            page: Page::Templates,
            ..
        }
    ));
}

#[test]
fn test_root_forwards_and_unknown_is_not_found() {
    let (navigator, session) = navigator();
    sign_in(&session, Role::User, false);

    assert_eq!(
        navigator.evaluate("/"),
        Navigation::Redirect(Redirect::to(DASHBOARD_PATH))
    );
    assert_eq!(navigator.evaluate("/no-such-page"), Navigation::NotFound);
}
