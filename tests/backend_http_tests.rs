use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use phishsim_console::{
    HttpBackend,
    backend::Backend,
    error::BackendError,
    models::LoginRequest,
    role::Role,
};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;

// --- Fake REST backend ---

const SESSION_COOKIE: &str = "sid=operator-session";

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.contains(SESSION_COOKIE))
}

fn user_body(role: &str) -> Value {
    json!({
        "user": {
            "_id": 314,
            "username": "Morgan",
            "email": "morgan@example.com",
            "role": role,
            "isReadOnly": true
        }
    })
}

async fn protected(headers: HeaderMap) -> Response {
    if has_session(&headers) {
        Json(user_body("editor")).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "no session" }))).into_response()
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "hunter2" {
        (
            [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
            Json(user_body("editor")),
        )
            .into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn logout() -> StatusCode {
    StatusCode::OK
}

/// Serves `router` under `/api` on an ephemeral port and returns the base URL.
async fn spawn_backend(router: Router) -> String {
    let app = Router::new().nest("/api", router);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}/api", port)
}

fn session_backend() -> Router {
    Router::new()
        .route("/protected", get(protected))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

fn client(base_url: &str) -> HttpBackend {
    HttpBackend::new(base_url, Duration::from_secs(5)).unwrap()
}

fn credentials(password: &str) -> LoginRequest {
    LoginRequest {
        email: "morgan@example.com".to_string(),
        password: password.to_string(),
        from: None,
    }
}

// --- Identity check and login ---

#[tokio::test]
async fn test_whoami_without_cookie_is_rejected() {
    let backend = client(&spawn_backend(session_backend()).await);

    let err = backend.whoami().await.unwrap_err();
    assert!(matches!(err, BackendError::Status(StatusCode::UNAUTHORIZED)));
    assert!(err.is_rejection());
}

#[tokio::test]
async fn test_login_cookie_is_replayed_on_whoami() {
    let backend = client(&spawn_backend(session_backend()).await);

    let user = backend.login(&credentials("hunter2")).await.unwrap();
    assert_eq!(user.identity.id, "314");
    assert_eq!(user.identity.name, "Morgan");
    assert_eq!(user.role, Role::Editor);
    assert!(user.is_read_only);

    let again = backend.whoami().await.unwrap();
    assert_eq!(again, user);
}

#[tokio::test]
async fn test_wrong_password_is_a_rejection() {
    let backend = client(&spawn_backend(session_backend()).await);

    let err = backend.login(&credentials("guess")).await.unwrap_err();
    assert!(err.is_rejection());
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_tolerated() {
    let base = spawn_backend(session_backend()).await;
    let backend = client(&format!("{base}/"));

    assert!(backend.login(&credentials("hunter2")).await.is_ok());
    assert!(backend.logout().await.is_ok());
}

#[tokio::test]
async fn test_unknown_role_is_malformed() {
    let base = spawn_backend(Router::new().route(
        "/protected",
        get(|| async { Json(user_body("owner")) }),
    ))
    .await;

    let err = client(&base).whoami().await.unwrap_err();
    assert!(matches!(err, BackendError::Malformed(_)));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let base = spawn_backend(Router::new().route("/protected", get(|| async { "<html>" }))).await;

    let err = client(&base).whoami().await.unwrap_err();
    assert!(matches!(err, BackendError::Malformed(_)));
}

#[tokio::test]
async fn test_server_error_is_not_a_rejection() {
    let base = spawn_backend(Router::new().route(
        "/protected",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;

    let err = client(&base).whoami().await.unwrap_err();
    assert!(matches!(
        err,
        BackendError::Status(StatusCode::INTERNAL_SERVER_ERROR)
    ));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to obtain a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = client(&format!("http://127.0.0.1:{port}/api"))
        .whoami()
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn test_logout_failure_is_reported() {
    let base = spawn_backend(Router::new().route(
        "/auth/logout",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    ))
    .await;

    let err = client(&base).logout().await.unwrap_err();
    assert!(matches!(
        err,
        BackendError::Status(StatusCode::SERVICE_UNAVAILABLE)
    ));
}

// --- Super-admin check ---

async fn super_admin_answer(status: StatusCode, body: Value) -> Result<bool, BackendError> {
    let base = spawn_backend(Router::new().route(
        "/super-admin-check",
        get(move || async move { (status, Json(body)) }),
    ))
    .await;

    client(&base).super_admin_check().await
}

#[tokio::test]
async fn test_super_admin_confirmed() {
    let verdict = super_admin_answer(StatusCode::OK, json!({ "isSuperAdmin": true })).await;
    assert!(verdict.unwrap());
}

#[tokio::test]
async fn test_super_admin_confirmed_by_success_field() {
    let verdict = super_admin_answer(StatusCode::OK, json!({ "success": true })).await;
    assert!(verdict.unwrap());
}

#[tokio::test]
async fn test_super_admin_explicit_false() {
    let verdict = super_admin_answer(StatusCode::OK, json!({ "isSuperAdmin": false })).await;
    assert!(!verdict.unwrap());
}

#[tokio::test]
async fn test_super_admin_missing_flag_is_not_a_confirmation() {
    let verdict = super_admin_answer(StatusCode::OK, json!({ "message": "ok" })).await;
    assert!(matches!(verdict, Err(BackendError::Malformed(_))));
}

#[tokio::test]
async fn test_super_admin_forbidden() {
    let verdict = super_admin_answer(StatusCode::FORBIDDEN, json!({ "isSuperAdmin": true })).await;
    assert!(matches!(
        verdict,
        Err(BackendError::Status(StatusCode::FORBIDDEN))
    ));
}
