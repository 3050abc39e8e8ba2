//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management
//! - Schema bootstrap
//! - Repository implementations

pub mod connection;
pub mod mysql;
pub mod schema;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::{MySqlIdentityRepository, MySqlRefreshLedger};
pub use schema::ensure_schema;
