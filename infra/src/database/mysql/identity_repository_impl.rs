//! MySQL implementation of the IdentityRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use hl_core::domain::entities::identity::{Account, AccountCredentials, NewAccount};
use hl_core::errors::DomainError;
use hl_core::repositories::IdentityRepository;

use super::{map_insert_error, storage_error};

/// MySQL implementation of IdentityRepository over the `users` table
///
/// Rows with a non-null `deleted_at` are treated as absent.
pub struct MySqlIdentityRepository {
    pool: MySqlPool,
}

impl MySqlIdentityRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &MySqlRow) -> Result<Account, DomainError> {
        let column = |name: &str, e: sqlx::Error| DomainError::Storage {
            message: format!("Failed to get {}: {}", name, e),
        };

        Ok(Account {
            id: row.try_get("id").map_err(|e| column("id", e))?,
            name: row.try_get("name").map_err(|e| column("name", e))?,
            email: row.try_get("email").map_err(|e| column("email", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column("created_at", e))?,
        })
    }
}

#[async_trait]
impl IdentityRepository for MySqlIdentityRepository {
    async fn find_active_by_id(&self, id: &str) -> Result<Option<Account>, DomainError> {
        let query = r#"
            SELECT id, name, email, created_at
            FROM users
            WHERE id = ? AND deleted_at IS NULL
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find user by id", e))?;

        result.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, DomainError> {
        let query = r#"
            SELECT id, name, email, created_at, password_hash
            FROM users
            WHERE email = ? AND deleted_at IS NULL
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find user by email", e))?;

        match result {
            Some(row) => {
                let password_hash: String = row
                    .try_get("password_hash")
                    .map_err(|e| storage_error("read password hash", e))?;
                Ok(Some(AccountCredentials {
                    account: Self::row_to_account(&row)?,
                    password_hash,
                }))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, account: NewAccount) -> Result<Account, DomainError> {
        let id = Uuid::new_v4().to_string();

        let query = r#"
            INSERT INTO users (id, email, password_hash, name)
            VALUES (?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(format!("account {}", account.email), e))?;

        tracing::info!(user_id = %id, "Created user account");

        self.find_active_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::Internal {
                message: format!("User {} missing right after insert", id),
            })
    }
}
