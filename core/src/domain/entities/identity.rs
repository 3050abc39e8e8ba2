//! Account and identity entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated principal carried inside every token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier
    pub id: String,

    /// Email address the user signed up with
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// A stored user account as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The identity to embed in tokens for this account
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.email.clone())
    }
}

/// Registration payload with an already-hashed password.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Login lookup result: the account plus its password hash.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_identity() {
        let account = Account {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(account.identity(), Identity::new("u-1", "ada@example.com"));
    }
}
