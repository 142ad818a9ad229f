use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("data nests deeper than the supported {limit} levels")]
    DepthExceeded { limit: usize },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn depth_exceeded(limit: usize) -> Self {
        Self::DepthExceeded { limit }
    }
}
