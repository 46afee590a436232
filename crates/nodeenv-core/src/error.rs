//! Shared error type across nodeenv crates.

use std::fmt::Display;

use thiserror::Error;

/// Status reasons reported back to the API server (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReason {
    /// Malformed input.
    BadRequest,
    /// Rejected by admission policy.
    Forbidden,
    /// Referenced object does not exist.
    NotFound,
    /// Anything the caller cannot fix.
    InternalError,
}

impl StatusReason {
    /// String representation used in `AdmissionReview` status payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusReason::BadRequest => "BadRequest",
            StatusReason::Forbidden => "Forbidden",
            StatusReason::NotFound => "NotFound",
            StatusReason::InternalError => "InternalError",
        }
    }

    /// HTTP status code carried in `status.code`.
    pub fn http_code(self) -> u16 {
        match self {
            StatusReason::BadRequest => 400,
            StatusReason::Forbidden => 403,
            StatusReason::NotFound => 404,
            StatusReason::InternalError => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, NodeEnvError>;

/// Unified error type used by core and admission.
#[derive(Debug, Error)]
pub enum NodeEnvError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("{resource} \"{name}\" is forbidden: {reason}")]
    Forbidden {
        resource: String,
        name: String,
        reason: String,
    },
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: &'static str, name: String },
    #[error("node selector resolution failed: {0}")]
    Resolution(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u32),
    #[error("internal: {0}")]
    Internal(String),
}

impl NodeEnvError {
    /// Build a policy rejection for `resource "name"`.
    pub fn forbidden(resource: &str, name: &str, reason: impl Display) -> Self {
        NodeEnvError::Forbidden {
            resource: resource.to_string(),
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Map internal error to a stable status reason.
    pub fn status_reason(&self) -> StatusReason {
        match self {
            NodeEnvError::BadRequest(_)
            | NodeEnvError::InvalidSelector(_)
            | NodeEnvError::UnsupportedVersion(_) => StatusReason::BadRequest,
            NodeEnvError::Forbidden { .. } => StatusReason::Forbidden,
            NodeEnvError::NotFound { .. } => StatusReason::NotFound,
            NodeEnvError::Resolution(_)
            | NodeEnvError::Configuration(_)
            | NodeEnvError::Internal(_) => StatusReason::InternalError,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, NodeEnvError::Forbidden { .. })
    }
}
