use super::{Page, RouteEntry};
use crate::guard::{DASHBOARD_PATH, Guard};

/// Authenticated Path Module
///
/// The day-to-day console: campaign management and the content that feeds
/// campaigns. Everything here is rendered inside the shared page frame.
///
/// Access Control Strategy:
/// Feature pages use the "any role" guard, which lets every authenticated
/// role in but confines read-only sessions to the dashboard, campaigns,
/// campaign results and settings. `/profile` only needs a session, so it
/// uses the plain authentication guard and stays open to read-only users.
pub fn authenticated_routes() -> Vec<RouteEntry> {
    let any_role = || Guard::any_role(DASHBOARD_PATH);

    vec![
        // /
        // Bare console root forwards to the dashboard.
        RouteEntry::forward("/", DASHBOARD_PATH),
        // /profile
        // The operator's own account page.
        RouteEntry::guarded("/profile", Page::Profile, Guard::authenticated()),
        // --- Overview ---
        RouteEntry::guarded(DASHBOARD_PATH, Page::Dashboard, any_role()).in_nav("Dashboard"),
        // --- Campaigns ---
        // /campaigns/new is listed before /campaigns/{id} for readability;
        // the table prefers literal segments regardless of order.
        RouteEntry::guarded("/campaigns", Page::Campaigns, any_role()).in_nav("Campaigns"),
        RouteEntry::guarded("/campaigns/new", Page::NewCampaign, any_role()),
        RouteEntry::guarded("/campaigns/{id}", Page::CampaignDetail, any_role()),
        RouteEntry::guarded("/campaign-results/{id}", Page::CampaignResults, any_role()),
        // --- Campaign content ---
        // Email templates and the landing pages they link to.
        RouteEntry::guarded("/templates", Page::Templates, any_role()).in_nav("Email Templates"),
        RouteEntry::guarded("/templates/{id}", Page::TemplateEditor, any_role()),
        RouteEntry::guarded("/landing-pages", Page::LandingPages, any_role())
            .in_nav("Landing Pages"),
        RouteEntry::guarded("/landing-pages/{id}", Page::LandingPageEditor, any_role()),
        // SMTP sending profiles used to deliver campaign mail.
        RouteEntry::guarded("/sending-profiles", Page::SendingProfiles, any_role())
            .in_nav("Sending Profiles"),
        // --- Targets ---
        RouteEntry::guarded("/groups", Page::Groups, any_role()).in_nav("Users & Groups"),
        RouteEntry::guarded("/groups/{id}", Page::GroupDetail, any_role()),
        // --- Awareness ---
        RouteEntry::guarded("/quizzes", Page::Quizzes, any_role()).in_nav("Quizzes"),
        RouteEntry::guarded("/quizzes/{id}", Page::QuizEditor, any_role()),
        RouteEntry::guarded("/quizzes/{id}/results", Page::QuizResults, any_role()),
        RouteEntry::guarded("/training-modules", Page::TrainingModules, any_role())
            .in_nav("Training"),
        // --- Organisation ---
        RouteEntry::guarded("/projects", Page::Projects, any_role()).in_nav("Projects"),
        RouteEntry::guarded("/projects/{id}", Page::ProjectDetail, any_role()),
        RouteEntry::guarded("/analytics", Page::Analytics, any_role()).in_nav("Analytics"),
        RouteEntry::guarded("/settings", Page::Settings, any_role()).in_nav("Settings"),
    ]
}
