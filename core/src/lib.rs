//! # Habitline Core
//!
//! Token authentication core for the Habitline backend.
//! This crate contains the token domain entities, the issuance and rotation
//! services, the refresh ledger and identity repository interfaces, and the
//! error taxonomy shared by every layer above it.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
