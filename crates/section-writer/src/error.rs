use serde::Serialize;
use thiserror::Error;

/// Why a generation call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    /// Credentials were rejected (HTTP 401)
    AuthFailure,
    /// Credits exhausted, permission denied or rate limited (HTTP 402/403/429)
    QuotaExceeded,
    /// The call did not complete before the client timeout
    Timeout,
    Other,
}

impl std::fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceErrorKind::AuthFailure => write!(f, "authentication failure"),
            ServiceErrorKind::QuotaExceeded => write!(f, "quota exceeded"),
            ServiceErrorKind::Timeout => write!(f, "timeout"),
            ServiceErrorKind::Other => write!(f, "service error"),
        }
    }
}

/// Failure reported by a generation service boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::AuthFailure, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::QuotaExceeded, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Timeout, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Other, message)
    }
}
