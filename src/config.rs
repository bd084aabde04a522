use std::{env, str::FromStr, time::Duration};

/// Backend base URL used when running locally without `CONSOLE_BACKEND_URL`.
pub const LOCAL_BACKEND_URL: &str = "http://localhost:5000/api";
/// Loopback by default: the host serves a single operator.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// AppConfig
///
/// Holds the console host's entire configuration. Immutable once loaded and
/// pulled into handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which settings are mandatory.
    pub env: Env,
    // Base URL of the REST backend (`/protected`, `/auth/login`, ... are appended).
    pub backend_url: String,
    // Address the console host listens on.
    pub bind_addr: String,
    // Per-request timeout for backend calls, in seconds.
    pub request_timeout_secs: u64,
    // Maximum number of toasts kept in the notification area.
    pub notification_capacity: usize,
    // Toasts older than this are dropped, in seconds.
    pub notification_ttl_secs: u64,
    // How long a navigation request waits for a verdict before answering "checking", in ms.
    pub navigation_wait_ms: u64,
}

/// Env
///
/// Runtime context: pretty logs and local defaults, or JSON logs and mandatory settings.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking configuration for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            backend_url: LOCAL_BACKEND_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            request_timeout_secs: 10,
            notification_capacity: 20,
            notification_ttl_secs: 30,
            navigation_wait_ms: 5_000,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment, **fail-fast**.
    ///
    /// # Panics
    /// Panics when `CONSOLE_BACKEND_URL` is missing in production, when a
    /// numeric setting is present but not a number, or when the notification
    /// TTL does not fit a duration. A console pointed at the
    /// wrong backend must not start.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let defaults = Self::default();

        let backend_url = match env {
            Env::Production => env::var("CONSOLE_BACKEND_URL")
                .expect("FATAL: CONSOLE_BACKEND_URL must be set in production."),
            Env::Local => env::var("CONSOLE_BACKEND_URL").unwrap_or(defaults.backend_url),
        };

        Self {
            env,
            backend_url,
            bind_addr: env::var("CONSOLE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            request_timeout_secs: numeric_var(
                "CONSOLE_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            notification_capacity: numeric_var(
                "CONSOLE_NOTIFICATION_CAPACITY",
                defaults.notification_capacity,
            ),
            notification_ttl_secs: ttl_var(
                "CONSOLE_NOTIFICATION_TTL_SECS",
                defaults.notification_ttl_secs,
            ),
            navigation_wait_ms: numeric_var("CONSOLE_NAVIGATION_WAIT_MS", defaults.navigation_wait_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigation_wait(&self) -> Duration {
        Duration::from_millis(self.navigation_wait_ms)
    }

    /// Saturates at `chrono::Duration::MAX` for values `load` would reject.
    pub fn notification_ttl(&self) -> chrono::Duration {
        i64::try_from(self.notification_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

/// A number of seconds that must fit a `chrono::Duration`.
fn ttl_var(name: &str, default: u64) -> u64 {
    let secs = numeric_var(name, default);
    let fits = i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .is_some();

    if !fits {
        panic!("FATAL: {name} is out of range, got {secs}");
    }
    secs
}

fn numeric_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {name} must be a number, got {raw:?}")),
        Err(_) => default,
    }
}
