use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core: who is logged in, and what they may open.
pub mod role;
pub mod session;
pub mod guard;
pub mod super_admin;
pub mod routes;
pub mod navigator;

// Backend client and console host services.
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod models;
pub mod notifications;

use auth::ActiveSession;

// --- Public Re-exports ---

pub use backend::{BackendState, HttpBackend, MockBackend, MockVerdict};
pub use config::AppConfig;
pub use navigator::{Navigation, Navigator};
pub use routes::RouteTable;
pub use session::{Session, SessionState, SessionStore};

use frame::ThemeFlag;
use notifications::NotificationCenter;

/// ApiDoc
///
/// OpenAPI description of the console host's own HTTP surface, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_session, handlers::login, handlers::logout,
        handlers::navigate_root, handlers::navigate,
        handlers::get_frame, handlers::get_notifications, handlers::dismiss_notification,
        handlers::set_theme
    ),
    components(
        schemas(
            models::SessionView, models::Identity, models::LoadingState, models::LoginRequest,
            models::LoginResponse, models::NavigationResponse, models::FrameView,
            models::NavItem, models::Notification, models::NotificationLevel,
            models::Theme, models::ThemeRequest, role::Role, routes::Page,
        )
    ),
    tags(
        (name = "phishsim-console", description = "Phishing-simulation admin console host")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request may touch, shared across all requests. The session
/// store is the one piece of shared mutable state the guards read.
#[derive(Clone)]
pub struct AppState {
    pub session: SessionState,
    pub backend: BackendState,
    pub navigator: Navigator,
    pub notifications: Arc<NotificationCenter>,
    pub theme: Arc<ThemeFlag>,
    pub config: AppConfig,
}

impl AppState {
    /// Wires a fresh (pending) session to `backend` and `table`.
    pub fn new(config: AppConfig, backend: BackendState, table: RouteTable) -> Self {
        let session: SessionState = Arc::new(SessionStore::new());
        let navigator = Navigator::new(Arc::new(table), Arc::clone(&session), Arc::clone(&backend));
        let notifications = Arc::new(NotificationCenter::new(
            config.notification_capacity,
            config.notification_ttl(),
        ));

        Self {
            session,
            backend,
            navigator,
            notifications,
            theme: Arc::new(ThemeFlag::default()),
            config,
        }
    }

    /// initialize_session
    ///
    /// Starts the one identity check of the process in the background.
    pub fn initialize_session(&self) -> tokio::task::JoinHandle<bool> {
        let session = Arc::clone(&self.session);
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move { session.initialize(backend.as_ref()).await })
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.session.clone()
    }
}

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Enforces an authenticated session for the host's `/api/*` routes.
///
/// *Mechanism*: `ActiveSession` implements `FromRequestParts`, so a session
/// that is still pending or resolved anonymous is rejected with 401 before
/// any handler runs. The handlers behind it do not extract the session again.
async fn session_middleware(_session: ActiveSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the console host's whole routing structure: public endpoints,
/// the guarded `/app` navigation and the session-protected `/api` routes.
/// Global layers for request correlation, tracing and CORS wrap the result,
/// and the unified state is registered on every route.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    // Public Routes: liveness, the session view and login/logout. No middleware.
    let public = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/session", get(handlers::get_session))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout));

    // Console Routes: every `/app` path is decided by the guard chain of its
    // table entry, so no middleware sits in front of them.
    let console = Router::new()
        .route(handlers::APP_PREFIX, get(handlers::navigate_root))
        .route("/app/{*path}", get(handlers::navigate));

    // Host API: protected by `session_middleware`. Anonymous callers get 401
    // here and never reach the handlers.
    let api = Router::new()
        .route("/api/frame", get(handlers::get_frame))
        .route("/api/notifications", get(handlers::get_notifications))
        .route(
            "/api/notifications/{id}",
            delete(handlers::dismiss_notification),
        )
        .route("/api/theme", put(handlers::set_theme))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let base_router = Router::new()
        // Documentation: Serve the generated Swagger UI and OpenAPI JSON.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public)
        .merge(console)
        .merge(api)
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request/response cycle,
                // built by `trace_span_logger` so it carries the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echoes x-request-id back to the caller.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (Applied last)
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the span `TraceLayer` opens for each request. It reads the
/// `x-request-id` header set by the layer above and records it next to the
/// HTTP method and URI, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
