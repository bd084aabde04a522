use crate::{
    AppState,
    auth,
    error::BackendError,
    frame,
    models::{
        FrameView, LoginRequest, LoginResponse, NavigationResponse, Notification, SessionView,
        ThemeRequest,
    },
    navigator::Navigation,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Prefix under which console paths are served by the host.
pub const APP_PREFIX: &str = "/app";

// --- Handlers ---

/// get_session
///
/// [Public Route] The current session, including `pending` while the initial
/// identity check is still running.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Session", body = SessionView))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.snapshot().view())
}

/// login
///
/// [Public Route] Forwards credentials to the backend and mirrors the result
/// into the session. Answers 401 for rejected credentials and 502 when the
/// backend could not be reached.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Rejected credentials"),
        (status = 502, description = "Backend unreachable")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, BackendError> {
    let response = auth::login(
        state.backend.as_ref(),
        &state.session,
        &state.notifications,
        payload,
    )
    .await?;
    Ok(Json(response))
}

/// logout
///
/// [Public Route] Always ends with an anonymous session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    auth::logout(state.backend.as_ref(), &state.session, &state.notifications).await;
    StatusCode::NO_CONTENT
}

/// navigate_root
///
/// [Guarded Route] `GET /app` is the console root.
#[utoipa::path(
    get,
    path = "/app",
    responses((status = 303, description = "Forward to the dashboard"))
)]
pub async fn navigate_root(State(state): State<AppState>) -> Response {
    navigate_to(state, "/".to_string()).await
}

/// navigate
///
/// [Guarded Route] Evaluates a console path through the guard layer.
///
/// * 200: allowed, with the page and (for authenticated pages) the frame.
/// * 303: denied, `Location` points at the redirect target under `/app`,
///   carrying `?from=` when the visitor should come back after login.
/// * 202: still checking (session or super-admin verification); retry.
/// * 404: no such console path.
#[utoipa::path(
    get,
    path = "/app/{path}",
    params(("path" = String, Path, description = "Console path")),
    responses(
        (status = 200, description = "Allowed", body = NavigationResponse),
        (status = 202, description = "Checking", body = NavigationResponse),
        (status = 303, description = "Denied, redirect", body = NavigationResponse),
        (status = 404, description = "Unknown path", body = NavigationResponse)
    )
)]
pub async fn navigate(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    navigate_to(state, format!("/{path}")).await
}

async fn navigate_to(state: AppState, path: String) -> Response {
    // Past the wait the navigation future is dropped, unmounting any
    // super-admin guard it mounted.
    let navigation =
        match tokio::time::timeout(state.config.navigation_wait(), state.navigator.navigate(&path))
            .await
        {
            Ok(navigation) => navigation,
            Err(_) => {
                tracing::debug!(%path, "navigation verdict not ready, answering checking");
                Navigation::Loading
            }
        };

    navigation_response(&state, path, navigation)
}

fn navigation_response(state: &AppState, path: String, navigation: Navigation) -> Response {
    let mut body = NavigationResponse {
        state: navigation.state().to_string(),
        path,
        page: None,
        params: BTreeMap::new(),
        redirect_to: None,
        from: None,
        frame: None,
    };

    match navigation {
        Navigation::Render {
            page,
            params,
            framed,
        } => {
            body.page = Some(page);
            body.params = params;
            if framed {
                body.frame = Some(build_frame(state));
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Navigation::Redirect(redirect) => {
            let mut location = format!("{APP_PREFIX}{}", redirect.to);
            if let Some(from) = &redirect.from {
                location.push_str("?from=");
                location.push_str(&urlencoding::encode(from));
            }

            body.redirect_to = Some(redirect.to);
            body.from = redirect.from;

            let mut response = (StatusCode::SEE_OTHER, Json(body)).into_response();
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
            response
        }
        Navigation::Loading => {
            let mut response = (StatusCode::ACCEPTED, Json(body)).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
            response
        }
        Navigation::NotFound => (StatusCode::NOT_FOUND, Json(body)).into_response(),
    }
}

fn build_frame(state: &AppState) -> FrameView {
    frame::build_frame(
        state.navigator.table(),
        &state.session.snapshot(),
        &state.notifications,
        state.theme.get(),
    )
}

/// get_frame
///
/// [Authenticated Route] The page frame for the current operator. The
/// session gate in front of `/api` has already rejected anonymous callers.
#[utoipa::path(
    get,
    path = "/api/frame",
    responses((status = 200, description = "Frame", body = FrameView))
)]
pub async fn get_frame(State(state): State<AppState>) -> Json<FrameView> {
    Json(build_frame(&state))
}

/// get_notifications
///
/// [Authenticated Route] Live toasts, oldest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses((status = 200, description = "Notifications", body = [Notification]))
)]
pub async fn get_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.list())
}

/// dismiss_notification
///
/// [Authenticated Route] Removes one toast.
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Dismissed"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.notifications.dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// set_theme
///
/// [Authenticated Route] Switches the console between light and dark.
#[utoipa::path(
    put,
    path = "/api/theme",
    request_body = ThemeRequest,
    responses((status = 200, description = "Theme set", body = ThemeRequest))
)]
pub async fn set_theme(
    State(state): State<AppState>,
    Json(payload): Json<ThemeRequest>,
) -> Json<ThemeRequest> {
    state.theme.set(payload.theme);
    Json(ThemeRequest {
        theme: state.theme.get(),
    })
}
