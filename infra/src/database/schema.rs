//! Table bootstrap for the users and refresh_tokens tables

use sqlx::MySqlPool;

use crate::InfrastructureError;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id CHAR(36) NOT NULL,
        email VARCHAR(255) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        name VARCHAR(120) NOT NULL,
        created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        deleted_at DATETIME(6) NULL,
        PRIMARY KEY (id),
        UNIQUE KEY uq_users_email (email)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

const CREATE_REFRESH_TOKENS: &str = r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        id BIGINT NOT NULL AUTO_INCREMENT,
        user_id CHAR(36) NOT NULL,
        jti VARCHAR(64) NOT NULL,
        token_hash CHAR(64) NULL,
        user_agent VARCHAR(512) NULL,
        ip_addr VARCHAR(64) NULL,
        expires_at DATETIME NOT NULL,
        is_revoked BOOLEAN NOT NULL DEFAULT FALSE,
        replaced_by VARCHAR(64) NULL,
        created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        PRIMARY KEY (id),
        UNIQUE KEY uq_refresh_tokens_jti (jti),
        KEY idx_refresh_tokens_user_id (user_id)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

/// Create the tables the server needs if they do not exist yet
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    for statement in [CREATE_USERS, CREATE_REFRESH_TOKENS] {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema ensured");
    Ok(())
}
