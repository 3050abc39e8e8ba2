//! Token issuance, rotation and revocation

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::{NewLedgerEntry, TokenPair, TokenStatus};
use crate::domain::value_objects::RequestMeta;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{IdentityRepository, RefreshLedger};

use super::authenticator::RequestAuthenticator;
use super::clock::{Clock, SystemClock};
use super::codec::TokenCodec;
use super::config::{ReplayPolicy, TokenServiceConfig};
use super::hashing::{hash_token, hashes_match};

/// Service for issuing and rotating access/refresh token pairs
///
/// Every refresh token it hands out has exactly one ledger row; rotation
/// consumes that row and creates the successor's.
pub struct TokenService<L: RefreshLedger, U: IdentityRepository> {
    ledger: L,
    identities: U,
    codec: Arc<TokenCodec>,
    replay_policy: ReplayPolicy,
}

impl<L: RefreshLedger, U: IdentityRepository> TokenService<L, U> {
    /// Creates a new token service instance using the wall clock
    ///
    /// # Arguments
    ///
    /// * `ledger` - Refresh ledger for persistence
    /// * `identities` - Account lookup used to re-check owners on rotation
    /// * `config` - Token service configuration
    pub fn new(ledger: L, identities: U, config: TokenServiceConfig) -> Self {
        Self::with_clock(ledger, identities, config, Arc::new(SystemClock))
    }

    /// Creates a new token service with an explicit time source
    pub fn with_clock(
        ledger: L,
        identities: U,
        config: TokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            identities,
            codec: Arc::new(TokenCodec::new(&config, clock)),
            replay_policy: config.replay_policy,
        }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// An authenticator sharing this service's keys and clock
    pub fn authenticator(&self) -> RequestAuthenticator {
        RequestAuthenticator::new(self.codec.clone())
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn identities(&self) -> &U {
        &self.identities
    }

    /// Issues a fresh token pair for an already-verified identity
    ///
    /// # Arguments
    ///
    /// * `identity` - The authenticated user
    /// * `meta` - Client metadata recorded on the ledger row
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The new pair; one ledger row was inserted
    /// * `Err(DomainError)` - Signing or persistence failed
    pub async fn issue(&self, identity: &Identity, meta: RequestMeta) -> Result<TokenPair, DomainError> {
        let access_token = self.codec.sign_access(identity)?;
        let (refresh_token, entry) = self.mint_refresh(identity, &meta)?;
        let jti = entry.jti.clone();

        self.ledger.insert(entry).await?;

        tracing::info!(user_id = %identity.id, jti = %jti, "Issued token pair");
        Ok(self.pair(access_token, refresh_token))
    }

    /// Exchanges a live refresh token for a new pair, consuming it
    ///
    /// Verification of the presented token always happens before any ledger
    /// access.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The successor pair
    /// * `Err(DomainError::Token(_))` - `InvalidToken`, `NotFound`, `Revoked`,
    ///   `HashMismatch` or `UserNotFound`
    /// * `Err(DomainError)` - Persistence failed
    pub async fn rotate(&self, old_refresh: &str, meta: RequestMeta) -> Result<TokenPair, DomainError> {
        let (claimed, jti) = self.codec.verify_refresh(old_refresh)?;

        let entry = self
            .ledger
            .find_by_jti_and_user(&jti, &claimed.id)
            .await?
            .ok_or(TokenError::NotFound)?;

        if entry.is_revoked {
            return Err(self.handle_replay(&entry.user_id, &jti, TokenError::Revoked).await);
        }
        if entry.is_expired_at(self.codec.now()) {
            return Err(TokenError::InvalidToken.into());
        }
        if let Some(stored) = entry.token_hash.as_deref() {
            if !hashes_match(stored, &hash_token(old_refresh)) {
                return Err(self.handle_replay(&entry.user_id, &jti, TokenError::HashMismatch).await);
            }
        }

        let account = self
            .identities
            .find_active_by_id(&claimed.id)
            .await?
            .ok_or(TokenError::UserNotFound)?;
        let identity = account.identity();

        let (refresh_token, successor) = self.mint_refresh(&identity, &meta)?;
        let successor_jti = successor.jti.clone();

        match self.ledger.rotate(&jti, successor).await {
            Ok(_) => {}
            Err(DomainError::Token(TokenError::Revoked)) => {
                return Err(self.handle_replay(&entry.user_id, &jti, TokenError::Revoked).await);
            }
            Err(e) => return Err(e),
        }

        let access_token = self.codec.sign_access(&identity)?;

        tracing::info!(
            user_id = %identity.id,
            jti = %jti,
            successor_jti = %successor_jti,
            "Rotated refresh token"
        );
        Ok(self.pair(access_token, refresh_token))
    }

    /// Ends the session of one refresh token
    ///
    /// Expired tokens are accepted so a client can always log out. Calling
    /// this twice is harmless.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The session was live and is now revoked
    /// * `Ok(false)` - It was already revoked or unknown
    pub async fn revoke(&self, refresh_token: &str) -> Result<bool, DomainError> {
        let (identity, jti, _) = self.codec.verify_refresh_signature(refresh_token)?;
        let revoked = self.ledger.revoke(&jti, &identity.id).await?;

        tracing::info!(user_id = %identity.id, jti = %jti, revoked, "Revoked refresh token");
        Ok(revoked)
    }

    /// Ends every session of a user
    pub async fn revoke_all(&self, user_id: &str) -> Result<u64, DomainError> {
        let count = self.ledger.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, revoked = count, "Revoked all refresh tokens");
        Ok(count)
    }

    /// Lifecycle state of a refresh token's ledger row
    pub async fn status(&self, refresh_token: &str) -> Result<TokenStatus, DomainError> {
        let (identity, jti, _) = self.codec.verify_refresh_signature(refresh_token)?;
        let entry = self
            .ledger
            .find_by_jti_and_user(&jti, &identity.id)
            .await?
            .ok_or(TokenError::NotFound)?;

        Ok(entry.status_at(self.codec.now()))
    }

    /// Sign a refresh token under a fresh `jti` and build its ledger row
    fn mint_refresh(
        &self,
        identity: &Identity,
        meta: &RequestMeta,
    ) -> Result<(String, NewLedgerEntry), DomainError> {
        let jti = Uuid::new_v4().to_string();
        let token = self.codec.sign_refresh(identity, &jti)?;
        let expires_at = self
            .codec
            .decode_expiry(&token)
            .ok_or_else(|| DomainError::Internal {
                message: "Signed refresh token carries no expiry".to_string(),
            })?;

        let entry = NewLedgerEntry {
            user_id: identity.id.clone(),
            jti,
            token_hash: Some(hash_token(&token)),
            user_agent: meta.user_agent.clone(),
            ip_addr: meta.ip.clone(),
            expires_at,
        };
        Ok((token, entry))
    }

    async fn handle_replay(&self, user_id: &str, jti: &str, kind: TokenError) -> DomainError {
        tracing::warn!(
            user_id = %user_id,
            jti = %jti,
            reason = kind.code(),
            "Refresh token presented after it was consumed"
        );

        if self.replay_policy == ReplayPolicy::RevokeAllSessions {
            match self.ledger.revoke_all_for_user(user_id).await {
                Ok(count) => {
                    tracing::warn!(user_id = %user_id, revoked = count, "Revoked all sessions after replay")
                }
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "Failed to revoke sessions after replay")
                }
            }
        }

        kind.into()
    }

    fn pair(&self, access_token: String, refresh_token: String) -> TokenPair {
        TokenPair::new(
            access_token,
            refresh_token,
            self.codec.access_ttl_seconds(),
            self.codec.refresh_ttl_seconds(),
        )
    }
}
