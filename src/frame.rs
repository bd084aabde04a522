use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    guard::Guard,
    models::{FrameView, NavItem, Theme},
    notifications::NotificationCenter,
    role::Role,
    routes::RouteTable,
    session::Session,
};

/// side_navigation
///
/// Side-bar entries the session can open, in table order.
///
/// An entry is listed when its guard would let the session through on the
/// cached state alone. Super-admin entries are listed for `superadmin`
/// sessions only; opening them is still re-verified by the backend.
pub fn side_navigation(table: &RouteTable, session: &Session) -> Vec<NavItem> {
    table
        .entries()
        .iter()
        .filter_map(|entry| {
            let label = entry.nav_label.as_ref()?;

            let visible = match entry.guard()? {
                Guard::SuperAdmin => session.role() == Some(Role::SuperAdmin),
                _ => entry.evaluate(session, &entry.pattern).is_allowed(),
            };

            visible.then(|| NavItem {
                label: label.clone(),
                path: entry.pattern.clone(),
            })
        })
        .collect()
}

/// build_frame
///
/// Assembles the persistent chrome around an authenticated page.
pub fn build_frame(
    table: &RouteTable,
    session: &Session,
    notifications: &NotificationCenter,
    theme: Theme,
) -> FrameView {
    FrameView {
        session: session.view(),
        navigation: side_navigation(table, session),
        notifications: notifications.list(),
        theme,
    }
}

/// ThemeFlag
///
/// Process-wide light/dark preference, the only view state shared across
/// pages besides the session.
#[derive(Debug, Default)]
pub struct ThemeFlag(AtomicBool);

impl ThemeFlag {
    pub fn get(&self) -> Theme {
        if self.0.load(Ordering::Relaxed) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn set(&self, theme: Theme) {
        self.0.store(theme == Theme::Dark, Ordering::Relaxed);
    }
}
