//! MySQL implementations of the core repository traits

mod identity_repository_impl;
mod refresh_ledger_impl;

pub use identity_repository_impl::MySqlIdentityRepository;
pub use refresh_ledger_impl::MySqlRefreshLedger;

use hl_core::errors::DomainError;

/// Map an insert failure, turning unique-key violations into `Conflict`
pub(crate) fn map_insert_error(resource: String, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Conflict { resource },
        _ => storage_error("insert", err),
    }
}

pub(crate) fn storage_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::Storage {
        message: format!("Failed to {}: {}", action, err),
    }
}
