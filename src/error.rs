use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// BackendError
///
/// Everything that can go wrong talking to the console's REST backend.
/// Callers in the guard layer never surface these: the session store folds
/// them into "anonymous" and the super-admin guard into "denied".
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend answered {0}")]
    Status(StatusCode),

    /// The backend answered 2xx but the body did not match the contract.
    #[error("malformed backend response: {0}")]
    Malformed(String),

    /// Raised by the in-process mock to simulate an outage.
    #[error("backend unavailable")]
    Unavailable,
}

impl BackendError {
    /// True when the backend was reached and explicitly refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status(status) if status.is_client_error())
    }
}

/// Login failures map to 401 when the backend refused the credentials and to
/// 502 for anything that points at the backend itself.
impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        if self.is_rejection() {
            StatusCode::UNAUTHORIZED.into_response()
        } else {
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// RouteTableError
///
/// Raised while assembling the path table; a table that fails validation
/// never reaches the navigator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("path pattern registered twice: {0}")]
    DuplicatePattern(String),

    #[error("route {pattern} redirects to {fallback}, which is not in the table")]
    UnknownFallback { pattern: String, fallback: String },

    #[error("path pattern must start with '/': {0}")]
    InvalidPattern(String),
}
