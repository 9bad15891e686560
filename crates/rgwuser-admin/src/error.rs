//! Admin API error types.

use std::fmt;

/// Gateway error codes that mean the addressed entity does not exist.
pub(crate) const NOT_FOUND_CODES: [&str; 3] = ["NoSuchUser", "NoSuchSubUser", "NoSuchKey"];

/// Errors returned by an [`AdminApi`](crate::AdminApi) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    /// The addressed user or subuser does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity (`user`, `subuser`).
        kind: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// The gateway answered with an unexpected status code.
    #[error("Admin API returned HTTP {status} ({code}): {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Gateway error code, empty when the body carried none.
        code: String,
        /// Raw response body or message.
        message: String,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("Admin API transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("Malformed admin API response: {0}")]
    Decode(String),

    /// The request could not be built (bad endpoint, bad credentials).
    #[error("Invalid admin API request: {0}")]
    InvalidRequest(String),
}

impl AdminError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `Http` error.
    #[must_use]
    pub fn http(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> AdminErrorCategory {
        match self {
            Self::NotFound { .. } => AdminErrorCategory::NotFound,
            Self::Http { .. } => AdminErrorCategory::Protocol,
            Self::Transport(_) => AdminErrorCategory::Transport,
            Self::Decode(_) => AdminErrorCategory::Protocol,
            Self::InvalidRequest(_) => AdminErrorCategory::Request,
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Categories of admin API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminErrorCategory {
    NotFound,
    Protocol,
    Transport,
    Request,
}

impl fmt::Display for AdminErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Protocol => write!(f, "protocol"),
            Self::Transport => write!(f, "transport"),
            Self::Request => write!(f, "request"),
        }
    }
}
