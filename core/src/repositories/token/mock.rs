//! In-memory implementation of RefreshLedger for tests and local runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{NewLedgerEntry, RefreshLedgerEntry};
use crate::errors::{DomainError, TokenError};

use super::r#trait::RefreshLedger;

#[derive(Default)]
struct LedgerState {
    rows: HashMap<String, RefreshLedgerEntry>,
    next_id: i64,
}

impl LedgerState {
    fn insert(&mut self, entry: NewLedgerEntry) -> Result<RefreshLedgerEntry, DomainError> {
        if self.rows.contains_key(&entry.jti) {
            return Err(DomainError::Conflict {
                resource: format!("refresh token {}", entry.jti),
            });
        }

        self.next_id += 1;
        let row = entry.into_entry(self.next_id, Utc::now());
        self.rows.insert(row.jti.clone(), row.clone());
        Ok(row)
    }

    fn revoke_and_link(&mut self, jti: &str, successor_jti: &str) -> bool {
        match self.rows.get_mut(jti) {
            Some(row) if !row.is_revoked => {
                row.is_revoked = true;
                row.replaced_by = Some(successor_jti.to_string());
                true
            }
            _ => false,
        }
    }
}

/// Refresh ledger backed by a `HashMap` keyed by `jti`
///
/// Every mutation holds the write lock for its whole duration, which gives
/// the same linearizable conditional update as the SQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryRefreshLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryRefreshLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a row by `jti` regardless of owner
    pub async fn get(&self, jti: &str) -> Option<RefreshLedgerEntry> {
        self.state.read().await.rows.get(jti).cloned()
    }

    /// All rows of a user, oldest first
    pub async fn entries_for_user(&self, user_id: &str) -> Vec<RefreshLedgerEntry> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .rows
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.id);
        rows
    }

    /// Number of rows stored
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RefreshLedger for InMemoryRefreshLedger {
    async fn insert(&self, entry: NewLedgerEntry) -> Result<RefreshLedgerEntry, DomainError> {
        self.state.write().await.insert(entry)
    }

    async fn find_by_jti_and_user(
        &self,
        jti: &str,
        user_id: &str,
    ) -> Result<Option<RefreshLedgerEntry>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .get(jti)
            .filter(|row| row.user_id == user_id)
            .cloned())
    }

    async fn revoke_and_link(&self, jti: &str, successor_jti: &str) -> Result<bool, DomainError> {
        Ok(self.state.write().await.revoke_and_link(jti, successor_jti))
    }

    async fn rotate(
        &self,
        old_jti: &str,
        successor: NewLedgerEntry,
    ) -> Result<RefreshLedgerEntry, DomainError> {
        let mut state = self.state.write().await;

        if state.rows.contains_key(&successor.jti) {
            return Err(DomainError::Conflict {
                resource: format!("refresh token {}", successor.jti),
            });
        }
        if !state.revoke_and_link(old_jti, &successor.jti) {
            return Err(TokenError::Revoked.into());
        }
        state.insert(successor)
    }

    async fn revoke(&self, jti: &str, user_id: &str) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;

        match state.rows.get_mut(jti) {
            Some(row) if row.user_id == user_id && !row.is_revoked => {
                row.is_revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, DomainError> {
        let mut state = self.state.write().await;
        let mut count = 0;

        for row in state.rows.values_mut() {
            if row.user_id == user_id && !row.is_revoked {
                row.is_revoked = true;
                count += 1;
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_entry(user_id: &str, jti: &str) -> NewLedgerEntry {
        NewLedgerEntry {
            user_id: user_id.to_string(),
            jti: jti.to_string(),
            token_hash: Some(format!("hash-{}", jti)),
            user_agent: Some("test-agent".to_string()),
            ip_addr: Some("127.0.0.1".to_string()),
            expires_at: Utc::now() + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_scoped_by_user() {
        let ledger = InMemoryRefreshLedger::new();
        let row = ledger.insert(new_entry("alice", "j1")).await.unwrap();

        assert_eq!(row.id, 1);
        assert!(!row.is_revoked);
        assert!(ledger.find_by_jti_and_user("j1", "alice").await.unwrap().is_some());
        assert!(ledger.find_by_jti_and_user("j1", "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_jti_conflicts() {
        let ledger = InMemoryRefreshLedger::new();
        ledger.insert(new_entry("alice", "j1")).await.unwrap();

        let result = ledger.insert(new_entry("bob", "j1")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_revoke_and_link_is_conditional() {
        let ledger = InMemoryRefreshLedger::new();
        ledger.insert(new_entry("alice", "j1")).await.unwrap();

        assert!(ledger.revoke_and_link("j1", "j2").await.unwrap());
        assert!(!ledger.revoke_and_link("j1", "j3").await.unwrap());
        assert!(!ledger.revoke_and_link("missing", "j4").await.unwrap());

        let row = ledger.get("j1").await.unwrap();
        assert!(row.is_revoked);
        assert_eq!(row.replaced_by.as_deref(), Some("j2"));
    }

    #[tokio::test]
    async fn test_rotate_links_and_inserts() {
        let ledger = InMemoryRefreshLedger::new();
        ledger.insert(new_entry("alice", "j1")).await.unwrap();

        let successor = ledger.rotate("j1", new_entry("alice", "j2")).await.unwrap();
        assert_eq!(successor.jti, "j2");

        let second = ledger.rotate("j1", new_entry("alice", "j3")).await;
        assert!(matches!(second, Err(DomainError::Token(TokenError::Revoked))));
        assert!(ledger.get("j3").await.is_none());
    }

    #[tokio::test]
    async fn test_revoke_all_for_user() {
        let ledger = InMemoryRefreshLedger::new();
        ledger.insert(new_entry("alice", "j1")).await.unwrap();
        ledger.insert(new_entry("alice", "j2")).await.unwrap();
        ledger.insert(new_entry("bob", "j3")).await.unwrap();
        ledger.revoke("j1", "alice").await.unwrap();

        assert_eq!(ledger.revoke_all_for_user("alice").await.unwrap(), 1);
        assert!(ledger.entries_for_user("alice").await.iter().all(|r| r.is_revoked));
        assert!(!ledger.get("j3").await.unwrap().is_revoked);
    }

    #[tokio::test]
    async fn test_revoke_requires_owner() {
        let ledger = InMemoryRefreshLedger::new();
        ledger.insert(new_entry("alice", "j1")).await.unwrap();

        assert!(!ledger.revoke("j1", "bob").await.unwrap());
        assert!(ledger.revoke("j1", "alice").await.unwrap());
        assert!(!ledger.revoke("j1", "alice").await.unwrap());
    }
}
