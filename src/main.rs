use phishsim_console::{
    AppState, HttpBackend, RouteTable,
    backend::BackendState,
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point of the console host. It brings up the core
/// components in order: Configuration, Logging, the Backend client, the path
/// table with the session bootstrap, and finally the HTTP Server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Reads .env settings first so AppConfig sees them.
    dotenv::dotenv().ok();
    // AppConfig::load() panics on a missing production backend URL or a bad numeric setting.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG takes priority. Without it, the console crate logs at debug
    // and tower_http at info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "phishsim_console=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    // The output format follows APP_ENV.
    match config.env {
        Env::Local => {
            // LOCAL: Pretty output for reading in a terminal.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON lines for a log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Console host starting in {:?} mode", config.env);

    // 4. Backend Client (REST API)
    // The client owns the cookie jar carrying the operator's session, and
    // every call is bounded by the configured request timeout.
    let backend = HttpBackend::new(&config.backend_url, config.request_timeout())
        .expect("FATAL: Failed to build the backend HTTP client.");
    let backend = Arc::new(backend) as BackendState;
    tracing::info!(backend = %config.backend_url, "Backend client ready");

    // 5. Path Table
    // Validated once at startup. A dangling fallback or duplicate pattern is
    // a programming error, so the process refuses to start.
    let table = RouteTable::console().expect("FATAL: Console path table is invalid.");

    // 6. Unified State Assembly and Session Bootstrap
    // The identity check runs once, in the background. Navigation requests
    // that arrive before it resolves answer "checking" or wait for it.
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config, backend, table);
    app_state.initialize_session();

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the console host address.");

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Console host stopped: {e}");
    }
}
