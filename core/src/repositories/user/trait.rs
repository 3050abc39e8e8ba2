//! Identity repository trait for account lookup and registration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::identity::{Account, AccountCredentials, NewAccount};
use crate::errors::DomainError;

/// Repository trait for user accounts
///
/// Soft-deleted accounts are invisible to every lookup.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Find an active (not soft-deleted) account by ID
    ///
    /// # Returns
    /// * `Ok(Some(Account))` - Account found
    /// * `Ok(None)` - No active account with this ID
    async fn find_active_by_id(&self, id: &str) -> Result<Option<Account>, DomainError>;

    /// Find an active account and its password hash by email
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, DomainError>;

    /// Create a new account
    ///
    /// # Returns
    /// * `Ok(Account)` - The created account
    /// * `Err(DomainError::Conflict)` - The email is already registered
    async fn create(&self, account: NewAccount) -> Result<Account, DomainError>;
}

#[async_trait]
impl<T: IdentityRepository + ?Sized> IdentityRepository for Arc<T> {
    async fn find_active_by_id(&self, id: &str) -> Result<Option<Account>, DomainError> {
        (**self).find_active_by_id(id).await
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, DomainError> {
        (**self).find_credentials_by_email(email).await
    }

    async fn create(&self, account: NewAccount) -> Result<Account, DomainError> {
        (**self).create(account).await
    }
}
