//! End-to-end issuance and rotation against the in-memory ledger

use std::sync::Arc;

use hl_core::domain::{Identity, NewAccount, RequestMeta};
use hl_core::errors::{DomainError, TokenError};
use hl_core::repositories::{IdentityRepository, InMemoryIdentityRepository, InMemoryRefreshLedger};
use hl_core::services::{TokenService, TokenServiceConfig};
use hl_shared::config::JwtConfig;

type Service = TokenService<InMemoryRefreshLedger, InMemoryIdentityRepository>;

async fn setup(user_id_hint: &str) -> (Arc<Service>, InMemoryRefreshLedger, Identity) {
    let jwt = JwtConfig::new(
        "access-secret-access-secret-access-secret",
        "refresh-secret-refresh-secret-refresh-secret",
    )
    .unwrap();
    let config = TokenServiceConfig::from_jwt_config(&jwt).unwrap();

    let ledger = InMemoryRefreshLedger::new();
    let users = InMemoryIdentityRepository::new();
    let account = users
        .create(NewAccount {
            name: user_id_hint.to_string(),
            email: "a@b.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();

    let service = Arc::new(TokenService::new(ledger.clone(), users, config));
    (service, ledger, account.identity())
}

#[tokio::test]
async fn issue_rotate_replay_scenario() {
    let (service, ledger, identity) = setup("u1").await;

    let first = service.issue(&identity, RequestMeta::default()).await.unwrap();
    let (_, jti0) = service.codec().verify_refresh(&first.refresh_token).unwrap();
    assert!(!ledger.get(&jti0).await.unwrap().is_revoked);

    let second = service
        .rotate(&first.refresh_token, RequestMeta::default())
        .await
        .unwrap();
    let (_, jti1) = service.codec().verify_refresh(&second.refresh_token).unwrap();

    let row0 = ledger.get(&jti0).await.unwrap();
    assert!(row0.is_revoked);
    assert_eq!(row0.replaced_by.as_deref(), Some(jti1.as_str()));
    let row1 = ledger.get(&jti1).await.unwrap();
    assert!(!row1.is_revoked);

    let replay = service
        .rotate(&first.refresh_token, RequestMeta::default())
        .await;
    assert!(matches!(replay, Err(DomainError::Token(TokenError::Revoked))));

    assert_eq!(ledger.len().await, 2);
    assert_eq!(ledger.get(&jti1).await.unwrap(), row1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rotation_yields_one_winner() {
    for _ in 0..20 {
        let (service, ledger, identity) = setup("racer").await;
        let r0 = service
            .issue(&identity, RequestMeta::default())
            .await
            .unwrap()
            .refresh_token;

        let a = {
            let service = service.clone();
            let token = r0.clone();
            tokio::spawn(async move { service.rotate(&token, RequestMeta::default()).await })
        };
        let b = {
            let service = service.clone();
            let token = r0.clone();
            tokio::spawn(async move { service.rotate(&token, RequestMeta::default()).await })
        };
        let (a, b) = tokio::join!(a, b);
        let results = [a.unwrap(), b.unwrap()];

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);

        let loser = results.iter().find(|r| r.is_err()).unwrap();
        let kind = loser.as_ref().unwrap_err().token_error();
        assert!(matches!(kind, Some(TokenError::Revoked) | Some(TokenError::HashMismatch)));

        // Parent plus exactly one live child
        let rows = ledger.entries_for_user(&identity.id).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().filter(|row| !row.is_revoked).count(), 1);
    }
}
