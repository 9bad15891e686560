use thiserror::Error;

/// Core error types for object-store user operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid object user specification: {0}")]
    InvalidSpecification(String),

    #[error("Invalid byte quantity {input:?}: {reason}")]
    InvalidQuantity { input: String, reason: String },

    #[error("Invalid subuser access level: {0}")]
    InvalidAccessLevel(String),

    #[error("Collaborator backend error ({backend}): {message}")]
    Backend { backend: String, message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidSpecification error
    pub fn invalid_specification(message: impl Into<String>) -> Self {
        Self::InvalidSpecification(message.into())
    }

    /// Create a new InvalidQuantity error
    pub fn invalid_quantity(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQuantity {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Backend error for a failing collaborator (inventory, secret or status store)
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by the declared specification rather than the environment
    pub fn is_specification_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpecification(_)
                | Self::InvalidQuantity { .. }
                | Self::InvalidAccessLevel(_)
        )
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
