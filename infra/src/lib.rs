//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Habitline server.
//! It provides concrete implementations of the core repository traits and
//! of the credential hashing used by registration and login.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL connection pool, schema bootstrap and repositories using SQLx
//! - **Security**: bcrypt password hashing

use hl_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Security module - Credential hashing
pub mod security;

pub use database::{DatabasePool, MySqlIdentityRepository, MySqlRefreshLedger};
pub use security::PasswordHasher;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing error
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => DomainError::Storage {
                message: e.to_string(),
            },
            other => DomainError::Internal {
                message: other.to_string(),
            },
        }
    }
}
