//! In-memory implementation of IdentityRepository for tests and local runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::identity::{Account, AccountCredentials, NewAccount};
use crate::errors::DomainError;

use super::trait_::IdentityRepository;

#[derive(Clone)]
struct StoredAccount {
    account: Account,
    password_hash: String,
    deleted: bool,
}

/// In-memory identity repository keyed by account ID
#[derive(Clone, Default)]
pub struct InMemoryIdentityRepository {
    accounts: Arc<RwLock<HashMap<String, StoredAccount>>>,
}

impl InMemoryIdentityRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an account as deleted; it disappears from every lookup
    pub async fn soft_delete(&self, id: &str) -> bool {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(id) {
            Some(stored) => {
                stored.deleted = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_active_by_id(&self, id: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.account.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|stored| !stored.deleted && stored.account.email == email)
            .map(|stored| AccountCredentials {
                account: stored.account.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn create(&self, new_account: NewAccount) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        // Email uniqueness covers soft-deleted rows too, as a database unique index would
        if accounts
            .values()
            .any(|stored| stored.account.email == new_account.email)
        {
            return Err(DomainError::Conflict {
                resource: format!("account {}", new_account.email),
            });
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: new_account.name,
            email: new_account.email,
            created_at: Utc::now(),
        };
        accounts.insert(
            account.id.clone(),
            StoredAccount {
                account: account.clone(),
                password_hash: new_account.password_hash,
                deleted: false,
            },
        );

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryIdentityRepository::new();
        let account = repo.create(new_account("ada@example.com")).await.unwrap();

        let found = repo.find_active_by_id(&account.id).await.unwrap();
        assert_eq!(found, Some(account.clone()));

        let credentials = repo
            .find_credentials_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credentials.account, account);
        assert_eq!(credentials.password_hash, "$2b$04$hash");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryIdentityRepository::new();
        repo.create(new_account("ada@example.com")).await.unwrap();

        let result = repo.create(new_account("ada@example.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_soft_deleted_accounts_are_hidden() {
        let repo = InMemoryIdentityRepository::new();
        let account = repo.create(new_account("ada@example.com")).await.unwrap();

        assert!(repo.soft_delete(&account.id).await);
        assert!(repo.find_active_by_id(&account.id).await.unwrap().is_none());
        assert!(repo
            .find_credentials_by_email("ada@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
