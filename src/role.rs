use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of console roles issued by the backend. Allow-lists in the
/// path table are built from these values, so a misspelled role is a compile
/// error rather than a silently unreachable page.
///
/// The read-only restriction is *not* a role: it is carried as a
/// separate flag on the session and can be combined with any of these values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    /// Standard console operator.
    User,
    /// May author templates, landing pages and quizzes.
    Editor,
    /// Manages users, the database browser and audit logs.
    Admin,
    /// Owns the super-admin subtree (always re-verified against the backend).
    SuperAdmin,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const ALL: [Role; 4] = [Role::User, Role::Editor, Role::Admin, Role::SuperAdmin];

    /// The wire tag used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Editor => "editor",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "editor" => Ok(Self::Editor),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid console role: {s}")),
        }
    }
}
