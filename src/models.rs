use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{role::Role, routes::Page};

// --- Identity & Session Schemas ---

/// Identity
///
/// The opaque user reference the backend hands out. It is immutable for the
/// lifetime of a session; a different identity means a new login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// SessionUser
///
/// An authenticated principal: who they are, their role, and whether they are
/// restricted to the read-only subset of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub identity: Identity,
    pub role: Role,
    pub is_read_only: bool,
}

/// LoadingState
///
/// Lifecycle of the process-wide session. Starts `Pending`, resolves exactly
/// once, and never goes back to `Pending` while the process lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum LoadingState {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "resolved-authenticated")]
    Authenticated,
    #[serde(rename = "resolved-anonymous")]
    Anonymous,
}

/// SessionView
///
/// Serializable projection of the session for the view layer (user badge,
/// `GET /session`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionView {
    pub state: LoadingState,
    pub user: Option<Identity>,
    pub role: Option<Role>,
    pub is_read_only: bool,
}

// --- Backend Wire Schemas ---

/// UserEnvelope
///
/// Body returned by both the identity check (`GET /protected`) and the login
/// endpoint: `{ "user": { ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: UserPayload,
}

/// UserPayload
///
/// The backend's user object. Identifier and display-name fields appear under
/// a couple of spellings depending on the backend build, hence the aliases.
/// An unknown role tag fails deserialization, which the session store treats
/// as a malformed body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, alias = "username")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub is_read_only: bool,
}

impl From<UserPayload> for SessionUser {
    fn from(payload: UserPayload) -> Self {
        SessionUser {
            identity: Identity {
                id: payload.id,
                name: payload.name,
                email: payload.email,
            },
            role: payload.role,
            is_read_only: payload.is_read_only,
        }
    }
}

/// SuperAdminCheck
///
/// Confirmation body of `GET /super-admin-check`. Older backends answer with
/// `success` instead of `isSuperAdmin`.
#[derive(Debug, Clone, Deserialize)]
pub struct SuperAdminCheck {
    #[serde(rename = "isSuperAdmin", alias = "success")]
    pub is_super_admin: bool,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Credentials forwarded verbatim to `POST /auth/login`. The password is never
/// logged or stored by the console host.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Console path the operator was bounced from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// ThemeRequest
///
/// Input payload for `PUT /api/theme`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// Theme
///
/// The one piece of cross-page view state besides the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

// --- Response Payloads (Output Schemas) ---

/// LoginResponse
///
/// Returned after a successful login: the new session and where the view
/// layer should go next.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginResponse {
    pub session: SessionView,
    pub redirect_to: String,
}

/// NavigationResponse
///
/// Body of every `GET /app/...` answer. `state` mirrors the guard states:
/// `checking`, `denied-redirect`, `allowed`, plus `not-found`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NavigationResponse {
    pub state: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameView>,
}

/// FrameView
///
/// The persistent chrome around every authenticated page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FrameView {
    pub session: SessionView,
    pub navigation: Vec<NavItem>,
    pub notifications: Vec<Notification>,
    pub theme: Theme,
}

/// NavItem
///
/// One entry of the side navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavItem {
    pub label: String,
    pub path: String,
}

/// NotificationLevel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Notification
///
/// A toast queued for the notification area of the page frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}
