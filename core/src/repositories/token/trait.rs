//! Refresh ledger trait defining the interface for refresh token persistence.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::token::{NewLedgerEntry, RefreshLedgerEntry};
use crate::errors::{DomainError, TokenError};

/// Durable record of every refresh token ever issued.
///
/// The ledger is the single source of truth for refresh-token validity beyond
/// the signature: a token whose row is revoked can never be rotated again.
///
/// # Consistency
/// - `jti` is unique; inserting a duplicate fails with `DomainError::Conflict`
/// - `revoke_and_link` is a conditional update: of two concurrent callers on
///   the same live row, exactly one observes `true`
/// - Rows are never deleted through this interface
#[async_trait]
pub trait RefreshLedger: Send + Sync {
    /// Persist a new, unrevoked ledger row
    ///
    /// # Returns
    /// * `Ok(RefreshLedgerEntry)` - The stored row with its surrogate id
    /// * `Err(DomainError::Conflict)` - A row with this `jti` already exists
    async fn insert(&self, entry: NewLedgerEntry) -> Result<RefreshLedgerEntry, DomainError>;

    /// Find a row by `jti`, scoped to its owner
    ///
    /// A `jti` that exists under a different user is reported as absent.
    async fn find_by_jti_and_user(
        &self,
        jti: &str,
        user_id: &str,
    ) -> Result<Option<RefreshLedgerEntry>, DomainError>;

    /// Revoke the row `jti` and record its successor, only if it is still unrevoked
    ///
    /// # Returns
    /// * `Ok(true)` - This call flipped the row from unrevoked to revoked
    /// * `Ok(false)` - The row was already revoked or does not exist
    async fn revoke_and_link(&self, jti: &str, successor_jti: &str) -> Result<bool, DomainError>;

    /// Consume `old_jti` and persist its successor
    ///
    /// The default sequences `revoke_and_link` and `insert`; stores with
    /// transactions should run both in one.
    ///
    /// # Returns
    /// * `Ok(RefreshLedgerEntry)` - The successor row
    /// * `Err(DomainError::Token(TokenError::Revoked))` - Another caller consumed `old_jti` first
    async fn rotate(
        &self,
        old_jti: &str,
        successor: NewLedgerEntry,
    ) -> Result<RefreshLedgerEntry, DomainError> {
        if !self.revoke_and_link(old_jti, &successor.jti).await? {
            return Err(TokenError::Revoked.into());
        }
        self.insert(successor).await
    }

    /// Revoke one session without a successor
    ///
    /// # Returns
    /// * `Ok(true)` - The row was live and is now revoked
    /// * `Ok(false)` - No live row for this `(jti, user)` pair
    async fn revoke(&self, jti: &str, user_id: &str) -> Result<bool, DomainError>;

    /// Revoke every live row of a user
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of rows revoked by this call
    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, DomainError>;
}

#[async_trait]
impl<T: RefreshLedger + ?Sized> RefreshLedger for Arc<T> {
    async fn insert(&self, entry: NewLedgerEntry) -> Result<RefreshLedgerEntry, DomainError> {
        (**self).insert(entry).await
    }

    async fn find_by_jti_and_user(
        &self,
        jti: &str,
        user_id: &str,
    ) -> Result<Option<RefreshLedgerEntry>, DomainError> {
        (**self).find_by_jti_and_user(jti, user_id).await
    }

    async fn revoke_and_link(&self, jti: &str, successor_jti: &str) -> Result<bool, DomainError> {
        (**self).revoke_and_link(jti, successor_jti).await
    }

    async fn rotate(
        &self,
        old_jti: &str,
        successor: NewLedgerEntry,
    ) -> Result<RefreshLedgerEntry, DomainError> {
        (**self).rotate(old_jti, successor).await
    }

    async fn revoke(&self, jti: &str, user_id: &str) -> Result<bool, DomainError> {
        (**self).revoke(jti, user_id).await
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, DomainError> {
        (**self).revoke_all_for_user(user_id).await
    }
}
