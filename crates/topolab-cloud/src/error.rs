//! Cloud provider error types

use std::fmt;
use thiserror::Error;

/// Closed set of provider failure categories.
///
/// Every typed `CloudError` maps back to exactly one of these through
/// [`CloudError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    ItemNotFound,
    MethodNotAllowed,
    OverLimit,
    ApiError,
    ServiceUnavailable,
    KeyPairExists,
}

impl ErrorKind {
    /// Build the typed error for this kind carrying `detail`.
    pub fn into_error(self, detail: impl Into<String>) -> CloudError {
        let detail = detail.into();
        match self {
            ErrorKind::BadRequest => CloudError::BadRequest(detail),
            ErrorKind::Unauthorized => CloudError::Unauthorized(detail),
            ErrorKind::ItemNotFound => CloudError::ItemNotFound(detail),
            ErrorKind::MethodNotAllowed => CloudError::MethodNotAllowed(detail),
            ErrorKind::OverLimit => CloudError::OverLimit(detail),
            ErrorKind::ApiError => CloudError::ApiError(detail),
            ErrorKind::ServiceUnavailable => CloudError::ServiceUnavailable(detail),
            ErrorKind::KeyPairExists => CloudError::KeyPairExists(detail),
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::OverLimit | ErrorKind::ApiError | ErrorKind::ServiceUnavailable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::ItemNotFound => "item_not_found",
            ErrorKind::MethodNotAllowed => "method_not_allowed",
            ErrorKind::OverLimit => "over_limit",
            ErrorKind::ApiError => "api_error",
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::KeyPairExists => "key_pair_exists",
        };
        f.write_str(name)
    }
}

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Bad request: {}", .0.trim_start())]
    BadRequest(String),

    #[error("Unauthorized: {}", .0.trim_start())]
    Unauthorized(String),

    #[error("Item not found: {}", .0.trim_start())]
    ItemNotFound(String),

    #[error("Method not allowed: {}", .0.trim_start())]
    MethodNotAllowed(String),

    #[error("Over limit: {}", .0.trim_start())]
    OverLimit(String),

    #[error("API error: {}", .0.trim_start())]
    ApiError(String),

    #[error("Service unavailable: {}", .0.trim_start())]
    ServiceUnavailable(String),

    #[error("Key pair already exists: {}", .0.trim_start())]
    KeyPairExists(String),

    /// The provider returned a status with no entry in the status table.
    #[error("No error mapping for HTTP status {status}: {}", detail.trim_start())]
    UnmappedStatus { status: u16, detail: String },

    /// A provider failure that carried no status code.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// The taxonomy entry for this error, if it is one of the typed kinds.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CloudError::BadRequest(_) => Some(ErrorKind::BadRequest),
            CloudError::Unauthorized(_) => Some(ErrorKind::Unauthorized),
            CloudError::ItemNotFound(_) => Some(ErrorKind::ItemNotFound),
            CloudError::MethodNotAllowed(_) => Some(ErrorKind::MethodNotAllowed),
            CloudError::OverLimit(_) => Some(ErrorKind::OverLimit),
            CloudError::ApiError(_) => Some(ErrorKind::ApiError),
            CloudError::ServiceUnavailable(_) => Some(ErrorKind::ServiceUnavailable),
            CloudError::KeyPairExists(_) => Some(ErrorKind::KeyPairExists),
            _ => None,
        }
    }

    /// Human-readable detail attached by the provider, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            CloudError::BadRequest(d)
            | CloudError::Unauthorized(d)
            | CloudError::ItemNotFound(d)
            | CloudError::MethodNotAllowed(d)
            | CloudError::OverLimit(d)
            | CloudError::ApiError(d)
            | CloudError::ServiceUnavailable(d)
            | CloudError::KeyPairExists(d)
            | CloudError::Provider(d) => Some(d),
            CloudError::UnmappedStatus { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Transient errors may succeed on retry; permanent ones will not.
    ///
    /// Failures without a status are treated as transient: they are
    /// transport-level problems the caller cannot fix by changing input.
    pub fn is_transient(&self) -> bool {
        match self {
            CloudError::Provider(_) | CloudError::Io(_) => true,
            CloudError::UnmappedStatus { status, .. } => *status >= 500,
            other => other.kind().is_some_and(ErrorKind::is_transient),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
