/// Console Path Table
///
/// Maps every console path to the page it shows and the guard that protects
/// it. The table is split into three modules that mirror the access levels,
/// so a path's protection is visible from the file it is declared in.
///
/// Contract: every non-public path sits behind the authentication guard, and
/// role-scoped paths add exactly one inner guard. Public paths must stay
/// reachable without any session.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    error::RouteTableError,
    guard::{Guard, GuardState},
    session::Session,
};

/// Paths reachable without a session: login, shared quiz links, training.
pub mod public;

/// Paths behind the authentication guard or the "any role" guard.
pub mod authenticated;

/// Paths behind role allow-lists and the super-admin guard.
pub mod admin;

/// Page
///
/// The feature screens of the console. Their bodies (tables, editors,
/// charts) belong to the view layer; the core only needs their identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Page {
    Login,
    PublicQuiz,
    Training,
    Unauthorized,
    Profile,
    Dashboard,
    Campaigns,
    NewCampaign,
    CampaignDetail,
    CampaignResults,
    Templates,
    TemplateEditor,
    LandingPages,
    LandingPageEditor,
    SendingProfiles,
    Groups,
    GroupDetail,
    Quizzes,
    QuizEditor,
    QuizResults,
    TrainingModules,
    Projects,
    ProjectDetail,
    Analytics,
    Settings,
    UserManagement,
    Database,
    AuditLogs,
    SuperAdminDashboard,
    Organizations,
    Licenses,
}

/// Access
///
/// How a path is protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session.
    Public,
    /// Guards evaluated outermost first; the first one that does not allow
    /// the session decides.
    Guarded(Vec<Guard>),
    /// The path only forwards somewhere else (e.g. `/` to the dashboard).
    Forward(String),
}

/// RouteEntry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: String,
    pub page: Option<Page>,
    pub access: Access,
    /// Side-navigation label; `None` keeps the page out of the side bar.
    pub nav_label: Option<String>,
}

impl RouteEntry {
    pub fn public(pattern: &str, page: Page) -> Self {
        Self {
            pattern: pattern.to_string(),
            page: Some(page),
            access: Access::Public,
            nav_label: None,
        }
    }

    pub fn guarded(pattern: &str, page: Page, guard: Guard) -> Self {
        Self {
            pattern: pattern.to_string(),
            page: Some(page),
            access: Access::Guarded(vec![guard]),
            nav_label: None,
        }
    }

    pub fn forward(pattern: &str, target: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            page: None,
            access: Access::Forward(target.to_string()),
            nav_label: None,
        }
    }

    /// Lists the entry in the side navigation under `label`.
    pub fn in_nav(mut self, label: &str) -> Self {
        self.nav_label = Some(label.to_string());
        self
    }

    /// within
    ///
    /// Nests the entry's guards inside `outer`. Public and forwarding entries
    /// are returned unchanged, as are entries already behind `outer`.
    pub fn within(mut self, outer: Guard) -> Self {
        if let Access::Guarded(guards) = &mut self.access {
            if !guards.contains(&outer) {
                guards.insert(0, outer);
            }
        }
        self
    }

    /// The innermost guard: the one that decides for authenticated sessions.
    pub fn guard(&self) -> Option<&Guard> {
        self.guards().last()
    }

    /// Every guard of the entry, outermost first.
    pub fn guards(&self) -> &[Guard] {
        match &self.access {
            Access::Guarded(guards) => guards.as_slice(),
            _ => &[],
        }
    }

    /// evaluate
    ///
    /// Runs the guard chain for `requested_path`. Unguarded entries allow.
    pub fn evaluate(&self, session: &Session, requested_path: &str) -> GuardState {
        self.guards()
            .iter()
            .map(|guard| guard.evaluate(session, requested_path))
            .find(|state| !state.is_allowed())
            .unwrap_or(GuardState::Allowed)
    }

    /// Number of literal (non-parameter) segments, used to rank matches.
    fn literal_segments(&self) -> usize {
        segments(&self.pattern)
            .filter(|segment| !is_param(segment))
            .count()
    }

    /// Matches `path` against the pattern, collecting `{param}` captures.
    fn capture(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut pattern = segments(&self.pattern);
        let mut requested = segments(path);
        let mut params = BTreeMap::new();

        loop {
            match (pattern.next(), requested.next()) {
                (None, None) => return Some(params),
                (Some(expected), Some(actual)) => {
                    if is_param(expected) {
                        let name = &expected[1..expected.len() - 1];
                        params.insert(name.to_string(), actual.to_string());
                    } else if expected != actual {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

/// RouteMatch
///
/// A table entry resolved for a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: BTreeMap<String, String>,
}

/// RouteTable
///
/// The validated path table. Construction fails rather than producing a
/// table with ambiguous or dangling entries.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// new
    ///
    /// Validates that patterns are absolute and unique, and that every
    /// fallback or forward target is itself a path of the table.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteTableError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !entry.pattern.starts_with('/') {
                return Err(RouteTableError::InvalidPattern(entry.pattern.clone()));
            }
            if !seen.insert(normalize(&entry.pattern)) {
                return Err(RouteTableError::DuplicatePattern(entry.pattern.clone()));
            }
        }

        let table = Self { entries };
        for entry in &table.entries {
            let targets: Vec<&str> = match &entry.access {
                Access::Guarded(guards) => guards.iter().filter_map(Guard::fallback).collect(),
                Access::Forward(target) => vec![target.as_str()],
                Access::Public => Vec::new(),
            };

            for target in targets {
                if table.resolve(target).is_none() {
                    return Err(RouteTableError::UnknownFallback {
                        pattern: entry.pattern.clone(),
                        fallback: target.to_string(),
                    });
                }
            }
        }

        Ok(table)
    }

    /// console
    ///
    /// The console's own table: public, then authenticated, then admin paths.
    ///
    /// Authenticated and admin paths are children of the authentication
    /// guard: anonymous visitors go to the login page with the requested path
    /// kept, and the inner role guard only ever sees a signed-in session.
    pub fn console() -> Result<Self, RouteTableError> {
        let mut entries = public::public_routes();
        entries.extend(
            authenticated::authenticated_routes()
                .into_iter()
                .chain(admin::admin_routes())
                .map(|entry| entry.within(Guard::authenticated())),
        );
        Self::new(entries)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// resolve
    ///
    /// Finds the entry for `path`. When several patterns match, the one with
    /// the most literal segments wins (`/campaigns/new` over
    /// `/campaigns/{id}`). A query string or fragment is ignored.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = normalize(path);

        self.entries
            .iter()
            .filter_map(|entry| entry.capture(&path).map(|params| (entry, params)))
            .max_by_key(|(entry, _)| entry.literal_segments())
            .map(|(entry, params)| RouteMatch { entry, params })
    }
}

/// Strips query/fragment and trailing slashes; the empty path becomes `/`.
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn is_param(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}
