use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback message when neither the server nor the transport says anything useful
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

/// Result type used by the HTTP pipeline
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors produced by the HTTP client wrapper
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The server answered with a non-2xx status
    #[error("{message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Best-available human readable message
        message: String,
        /// The `detail` field of the error body, if the server sent one
        detail: Option<String>,
    },

    /// The request never produced a response (connect failure, timeout, ...)
    #[error("{message}")]
    Transport {
        /// Message reported by the transport
        message: String,
        /// Whether the configured timeout elapsed
        timed_out: bool,
    },

    /// A request body could not be encoded
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// A successful response body did not have the expected shape
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a status error, choosing the message by the usual fallback order
    pub fn status(status: u16, detail: Option<String>) -> Self {
        let message = match detail.as_deref() {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => format!("Request failed with status code {}", status),
        };
        ApiError::Status {
            status,
            message,
            detail,
        }
    }

    /// Build a transport error; an empty transport message falls back to the generic one
    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        ApiError::Transport { message, timed_out }
    }

    /// HTTP status code of the failure, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure means the bearer credential was rejected
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// The message shown to the user for this failure
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// Category of this error when raised by a general request
    pub fn category(&self) -> ErrorCategory {
        if self.is_unauthorized() {
            ErrorCategory::SessionExpired
        } else {
            ErrorCategory::TransientRequest
        }
    }
}

/// How a failure is handled by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Login rejected; propagated to the caller
    Credential,
    /// Credential no longer accepted; forces a full session reset
    SessionExpired,
    /// Any other request failure; surfaced as a notification only
    TransientRequest,
    /// Remote theme save failed; logged and swallowed
    PersistenceBestEffort,
}

impl ErrorCategory {
    /// Whether errors of this category reset the session
    pub fn resets_session(&self) -> bool {
        matches!(self, ErrorCategory::SessionExpired)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Credential => "CREDENTIAL",
            ErrorCategory::SessionExpired => "SESSION_EXPIRED",
            ErrorCategory::TransientRequest => "TRANSIENT_REQUEST",
            ErrorCategory::PersistenceBestEffort => "PERSISTENCE_BEST_EFFORT",
        };
        write!(f, "{}", name)
    }
}

/// Errors from the local persisted key/value storage
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Writing the backing file failed
    #[error("failed to write storage file {path}: {message}")]
    Write {
        /// Path of the backing file
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The storage contents could not be serialized
    #[error("failed to serialize storage contents: {0}")]
    Serialize(String),
}

/// Errors surfaced by session operations
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// The credential exchange was rejected
    #[error("login rejected: {0}")]
    Credential(#[source] ApiError),

    /// The server accepted the credentials but returned no token
    #[error("login response did not contain an access token")]
    MissingToken,

    /// The operation needs an authenticated session
    #[error("not logged in")]
    NotLoggedIn,

    /// The token could not be persisted locally
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A request made on behalf of the session failed
    #[error(transparent)]
    Request(#[from] ApiError),
}

impl SessionError {
    /// Category used for handling policy
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::Credential(_) | SessionError::MissingToken => ErrorCategory::Credential,
            SessionError::NotLoggedIn => ErrorCategory::SessionExpired,
            SessionError::Storage(_) => ErrorCategory::TransientRequest,
            SessionError::Request(e) => e.category(),
        }
    }
}
