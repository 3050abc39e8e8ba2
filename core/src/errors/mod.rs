//! Domain-specific error types and error handling.

mod types;

pub use hl_shared::ConfigError;
pub use types::TokenError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Resource already exists: {resource}")]
    Conflict { resource: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// The token failure carried by this error, if any
    pub fn token_error(&self) -> Option<TokenError> {
        match self {
            DomainError::Token(err) => Some(*err),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
