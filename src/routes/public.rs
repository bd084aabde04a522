use super::{Page, RouteEntry};
use crate::guard::{LOGIN_PATH, UNAUTHORIZED_PATH};

/// Public Path Module
///
/// Console paths that are **unguarded** and must stay reachable without any
/// session: the login screen, the quiz link shared with campaign targets, and
/// the standalone training module.
///
/// Security Mandate:
/// Nothing in this module may be wrapped by a guard. A target clicking a
/// quiz link from a phishing simulation has no console account.
pub fn public_routes() -> Vec<RouteEntry> {
    vec![
        // /login
        // Entry point for operators; anonymous visitors are redirected here
        // with the path they asked for kept as redirect-back state.
        RouteEntry::public(LOGIN_PATH, Page::Login),
        // /quiz/{token}
        // Externally shared quiz-taking link. The token identifies the quiz
        // assignment, not a console user.
        RouteEntry::public("/quiz/{token}", Page::PublicQuiz),
        // /training and /training/{module_id}
        // Standalone awareness-training module for campaign targets.
        RouteEntry::public("/training", Page::Training),
        RouteEntry::public("/training/{module_id}", Page::Training),
        // /unauthorized
        // Landing page of a failed super-admin verification. Kept public so
        // the denial itself never depends on session state.
        RouteEntry::public(UNAUTHORIZED_PATH, Page::Unauthorized),
    ]
}
