//! Client Error Types
//!
//! Every failure that crosses into UI code is an [`ApiError`], which always
//! carries a single display-ready message. Callers never branch on the shape
//! of the server's error body.

/// Message used when no response was received at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Unable to reach the server. Please check your connection.";

/// Message used when the request budget elapsed.
pub const TIMEOUT_ERROR_MESSAGE: &str = "The server took too long to respond.";

/// Message surfaced to the caller of a request that triggered forced logout.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Client error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response was received
    #[error("{0}")]
    Network(String),

    /// The request budget elapsed before a response arrived
    #[error("{0}")]
    Timeout(String),

    /// Structured multi-field validation errors, already flattened
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response carrying a server or fallback message
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 401/403 on an authenticated call; forced logout has already run
    #[error("{0}")]
    Unauthorized(String),

    /// A 2xx body that did not match the expected shape
    #[error("{0}")]
    Decode(String),

    /// The session could not be persisted locally
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    /// The single human-readable message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network(msg)
            | ApiError::Timeout(msg)
            | ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Decode(msg)
            | ApiError::Storage(msg) => msg,
            ApiError::Server { message, .. } => message,
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Persistent storage error type
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Session storage error: {}", err);
        ApiError::Storage("Unable to save your session on this device.".into())
    }
}
