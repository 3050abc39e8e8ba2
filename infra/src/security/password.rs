//! bcrypt password hashing, run off the async executor

use crate::InfrastructureError;

/// Salt and digest of a well-formed bcrypt hash that matches no password we issue
const PLACEHOLDER_DIGEST: &str = "N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Hashes and verifies account passwords with bcrypt
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (4..=31)
    pub fn new(cost: u32) -> Result<Self, InfrastructureError> {
        if !(4..=31).contains(&cost) {
            return Err(InfrastructureError::Config(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password
    pub async fn hash(&self, password: &str) -> Result<String, InfrastructureError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| InfrastructureError::General(format!("Hashing task failed: {}", e)))?
            .map_err(InfrastructureError::from)
    }

    /// Check a plaintext password against a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, InfrastructureError> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| InfrastructureError::General(format!("Verification task failed: {}", e)))?
            .map_err(InfrastructureError::from)
    }

    /// Bcrypt hash at this hasher's cost, used when there is no stored hash
    pub fn placeholder_hash(&self) -> String {
        format!("$2b${:02}${}", self.cost, PLACEHOLDER_DIGEST)
    }

    /// Spend one verification on the placeholder hash.
    ///
    /// Login calls this for unknown emails so they take as long as a wrong password.
    pub async fn verify_without_account(&self, password: &str) -> Result<(), InfrastructureError> {
        self.verify(password, &self.placeholder_hash()).await.map(|_| ())
    }
}
