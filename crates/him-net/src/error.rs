use him_shared::constants::{BACKEND_UNREACHABLE, INVALID_JSON};
use thiserror::Error;

/// Why a backend call did not produce a usable payload.
///
/// Exactly one variant describes every failed call. [`ApiError::status`] is
/// `0` only when no HTTP response was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, refused, reset).
    #[error("backend unreachable: {reason}")]
    NetworkUnreachable { reason: String },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A 2xx body that does not match the expected schema.
    #[error("invalid payload (HTTP {status}): {reason}")]
    InvalidPayload { status: u16, reason: String },
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NetworkUnreachable { .. } => 0,
            ApiError::Http { status, .. } | ApiError::InvalidPayload { status, .. } => *status,
        }
    }

    /// Text shown to the operator: the raw response body for HTTP failures,
    /// a fixed marker otherwise.
    pub fn error_text(&self) -> &str {
        match self {
            ApiError::NetworkUnreachable { .. } => BACKEND_UNREACHABLE,
            ApiError::Http { body, .. } => body,
            ApiError::InvalidPayload { .. } => INVALID_JSON,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::NetworkUnreachable { .. })
    }

    /// 401 or 403 from the backend.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 | 403, .. })
    }
}

/// Outcome of a backend call. `Ok(None)` is a successful call whose body
/// was empty.
pub type ApiResult<T> = Result<Option<T>, ApiError>;

/// Rejected base URL configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL is empty")]
    EmptyBaseUrl,

    #[error("base URL must be an absolute http(s) URL: {0}")]
    InvalidBaseUrl(String),
}
