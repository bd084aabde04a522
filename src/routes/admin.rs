use super::{Page, RouteEntry};
use crate::{
    guard::{DASHBOARD_PATH, Guard},
    role::Role,
};

/// Admin Path Module
///
/// Paths restricted by role. These are the only screens that can change who
/// may use the console or read raw data.
///
/// Access Control:
/// - Role allow-lists decide from the cached session role and
///   ignore the read-only flag: a read-only admin still reaches `/database`.
/// - The `/super-admin` subtree does not trust the cached role at all. Every
///   entry re-verifies against the backend before anything renders.
pub fn admin_routes() -> Vec<RouteEntry> {
    let admins = || Guard::roles(&[Role::Admin, Role::SuperAdmin], DASHBOARD_PATH);

    vec![
        // /user-management
        // Console accounts, roles and the read-only flag.
        RouteEntry::guarded("/user-management", Page::UserManagement, admins())
            .in_nav("User Management"),
        // /database
        // Raw collection browser. Admin-only, read-only admins included.
        RouteEntry::guarded("/database", Page::Database, admins()).in_nav("Database"),
        // /audit-logs
        // Who changed what, and when.
        RouteEntry::guarded("/audit-logs", Page::AuditLogs, admins()).in_nav("Audit Logs"),
        // --- Super-admin subtree (backend-verified on every entry) ---
        RouteEntry::guarded("/super-admin", Page::SuperAdminDashboard, Guard::super_admin())
            .in_nav("Super Admin"),
        RouteEntry::guarded(
            "/super-admin/organizations",
            Page::Organizations,
            Guard::super_admin(),
        ),
        RouteEntry::guarded("/super-admin/licenses", Page::Licenses, Guard::super_admin()),
    ]
}
