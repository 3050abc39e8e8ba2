//! MySQL implementation of the RefreshLedger trait.
//!
//! Rows live in `refresh_tokens`, keyed by a unique `jti`. Revocation is a
//! conditional `UPDATE ... WHERE is_revoked = FALSE` whose affected-row count
//! tells the caller whether it won.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlConnection, MySqlPool, Row};

use hl_core::domain::entities::token::{NewLedgerEntry, RefreshLedgerEntry};
use hl_core::errors::{DomainError, TokenError};
use hl_core::repositories::RefreshLedger;

use super::{map_insert_error, storage_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, jti, token_hash, user_agent, ip_addr,
           expires_at, is_revoked, replaced_by, created_at
    FROM refresh_tokens
"#;

/// MySQL implementation of RefreshLedger
pub struct MySqlRefreshLedger {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshLedger {
    /// Create a new MySQL refresh ledger
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshLedgerEntry
    fn row_to_entry(row: &MySqlRow) -> Result<RefreshLedgerEntry, DomainError> {
        let column = |name: &str, e: sqlx::Error| DomainError::Storage {
            message: format!("Failed to get {}: {}", name, e),
        };

        Ok(RefreshLedgerEntry {
            id: row.try_get("id").map_err(|e| column("id", e))?,
            user_id: row.try_get("user_id").map_err(|e| column("user_id", e))?,
            jti: row.try_get("jti").map_err(|e| column("jti", e))?,
            token_hash: row.try_get("token_hash").map_err(|e| column("token_hash", e))?,
            user_agent: row.try_get("user_agent").map_err(|e| column("user_agent", e))?,
            ip_addr: row.try_get("ip_addr").map_err(|e| column("ip_addr", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column("expires_at", e))?,
            is_revoked: row.try_get("is_revoked").map_err(|e| column("is_revoked", e))?,
            replaced_by: row.try_get("replaced_by").map_err(|e| column("replaced_by", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column("created_at", e))?,
        })
    }

    /// Insert a row and read it back on the same connection
    async fn insert_on(
        conn: &mut MySqlConnection,
        entry: &NewLedgerEntry,
    ) -> Result<RefreshLedgerEntry, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                user_id, jti, token_hash, user_agent, ip_addr, expires_at, is_revoked
            ) VALUES (?, ?, ?, ?, ?, ?, FALSE)
        "#;

        let result = sqlx::query(query)
            .bind(&entry.user_id)
            .bind(&entry.jti)
            .bind(&entry.token_hash)
            .bind(&entry.user_agent)
            .bind(&entry.ip_addr)
            .bind(entry.expires_at)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_insert_error(format!("refresh token {}", entry.jti), e))?;

        let id = result.last_insert_id() as i64;
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| storage_error("read back refresh token", e))?;

        Self::row_to_entry(&row)
    }

    async fn revoke_and_link_on(
        conn: &mut MySqlConnection,
        jti: &str,
        successor_jti: &str,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, replaced_by = ?
            WHERE jti = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(successor_jti)
            .bind(jti)
            .execute(&mut *conn)
            .await
            .map_err(|e| storage_error("revoke refresh token", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RefreshLedger for MySqlRefreshLedger {
    async fn insert(&self, entry: NewLedgerEntry) -> Result<RefreshLedgerEntry, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("acquire connection", e))?;

        Self::insert_on(&mut conn, &entry).await
    }

    async fn find_by_jti_and_user(
        &self,
        jti: &str,
        user_id: &str,
    ) -> Result<Option<RefreshLedgerEntry>, DomainError> {
        let query = format!("{} WHERE jti = ? AND user_id = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(jti)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find refresh token", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn revoke_and_link(&self, jti: &str, successor_jti: &str) -> Result<bool, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("acquire connection", e))?;

        Self::revoke_and_link_on(&mut conn, jti, successor_jti).await
    }

    /// Revoke-and-link and the successor insert commit together or not at all
    async fn rotate(
        &self,
        old_jti: &str,
        successor: NewLedgerEntry,
    ) -> Result<RefreshLedgerEntry, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        if !Self::revoke_and_link_on(&mut tx, old_jti, &successor.jti).await? {
            tx.rollback()
                .await
                .map_err(|e| storage_error("roll back rotation", e))?;
            return Err(TokenError::Revoked.into());
        }

        // Dropping `tx` on error rolls the revocation back
        let entry = Self::insert_on(&mut tx, &successor).await?;

        tx.commit()
            .await
            .map_err(|e| storage_error("commit rotation", e))?;

        Ok(entry)
    }

    async fn revoke(&self, jti: &str, user_id: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE
            WHERE jti = ? AND user_id = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(jti)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("revoke refresh token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE
            WHERE user_id = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("revoke user refresh tokens", e))?;

        Ok(result.rows_affected())
    }
}
