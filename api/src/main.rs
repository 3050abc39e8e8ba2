use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;

use hl_api::{create_app, telemetry, AppState};
use hl_core::repositories::{IdentityRepository, RefreshLedger};
use hl_core::services::{ReplayPolicy, TokenServiceConfig};
use hl_infra::database::ensure_schema;
use hl_infra::{DatabasePool, MySqlIdentityRepository, MySqlRefreshLedger, PasswordHasher};
use hl_shared::config::{AppConfig, Environment, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    telemetry::init(&LoggingConfig::from_env(Environment::from_env()));

    // Configuration problems stop the process before anything binds
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;
    let token_config = TokenServiceConfig::from_jwt_config(&config.jwt)?
        .with_replay_policy(ReplayPolicy::from_env()?);
    let passwords = PasswordHasher::new(config.bcrypt_rounds)?;

    tracing::info!(
        environment = %config.environment,
        replay_policy = ?token_config.replay_policy,
        "Starting Habitline API server"
    );

    let database = DatabasePool::new(&config.database)
        .await
        .context("failed to connect to the database")?;
    if config.database.ensure_schema {
        ensure_schema(database.get_pool()).await?;
    }

    let ledger: Arc<dyn RefreshLedger> =
        Arc::new(MySqlRefreshLedger::new(database.get_pool().clone()));
    let identities: Arc<dyn IdentityRepository> =
        Arc::new(MySqlIdentityRepository::new(database.get_pool().clone()));

    let state = web::Data::new(AppState::new(ledger, identities, token_config, passwords));

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;

    database.close().await;
    Ok(())
}
