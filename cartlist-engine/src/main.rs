//! # Cartlist Engine
//!
//! Signs in with the configured access token, loads the account's session and
//! runs first-time setup if the account still needs it.
//!
//! With `CARTLIST_BACKEND=memory` a demo account is created in-process
//! instead, which is handy for trying the seed data without a backend.
//!
//! ## Usage
//!
//! ```bash
//! CARTLIST_BACKEND=memory cargo run -p cartlist-engine
//! ```

use anyhow::Context;
use cartlist_engine::auth::{AuthProvider, StaticAuthProvider, TokenAuthProvider};
use cartlist_engine::config::{BackendConfig, EngineConfig};
use cartlist_engine::notify::{Notice, Notifier, TracingNotifier};
use cartlist_engine::session::load_app_data;
use cartlist_engine::setup::{SetupOrchestrator, SetupOutcome, SetupReport};
use cartlist_engine::store::{MemoryStore, PgStore, RemoteStore, RestStore};
use cartlist_shared::auth::AuthUser;
use cartlist_shared::db::migrations::run_migrations;
use cartlist_shared::db::pool::create_pool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartlist_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Cartlist Engine v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = EngineConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        backend = config.backend.name(),
        setup_policy = %config.setup.policy,
        conflict_policy = %config.mutation.conflict_policy,
        "Configuration loaded"
    );

    let (store, auth) = match &config.backend {
        BackendConfig::Memory => {
            let memory = Arc::new(MemoryStore::new());
            let account_id = memory.add_account(Some("en"));
            tracing::info!(account_id = %account_id, "Created demo account");

            let store: Arc<dyn RemoteStore> = memory;
            let auth: Arc<dyn AuthProvider> = Arc::new(StaticAuthProvider::new(AuthUser {
                id: account_id,
                email: None,
                signup_language: None,
            }));
            (store, auth)
        }
        BackendConfig::Rest(rest) => {
            let store: Arc<dyn RemoteStore> =
                Arc::new(RestStore::new(rest.clone()).context("Failed to build REST client")?);
            (store, token_provider(&config)?)
        }
        BackendConfig::Postgres(database) => {
            let pool = create_pool(database.clone())
                .await
                .context("Failed to connect to database")?;
            run_migrations(&pool).await.context("Failed to run migrations")?;

            let store: Arc<dyn RemoteStore> = Arc::new(PgStore::new(pool));
            (store, token_provider(&config)?)
        }
    };

    let user = auth.current_user().await.context("No signed-in account")?;
    let app_data = load_app_data(store.as_ref(), user.id)
        .await
        .context("Failed to load session")?;

    let orchestrator = SetupOrchestrator::with_config(store.clone(), auth, config.setup.clone());
    let outcome = orchestrator
        .run(
            &app_data.profile,
            Some(Box::new(|report: &SetupReport| {
                tracing::debug!(list_id = ?report.list_id, "Starter list created");
                TracingNotifier.notify(Notice::info(format!(
                    "Welcome! Your starter list is ready with {} items",
                    report.items_created
                )));
            })),
        )
        .await;

    match outcome {
        SetupOutcome::Failed { stage, error } => {
            anyhow::bail!("First-time setup failed at {}: {}", stage, error)
        }
        SetupOutcome::RolledBack(report) => {
            anyhow::bail!(
                "First-time setup rolled back ({} categories, {} items missing)",
                report.categories_failed,
                report.items_failed
            )
        }
        outcome => {
            let lists = store.visible_lists(user.id).await?;
            tracing::info!(outcome = ?outcome, lists = lists.len(), "Session ready");
        }
    }

    Ok(())
}

fn token_provider(config: &EngineConfig) -> anyhow::Result<Arc<dyn AuthProvider>> {
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| anyhow::anyhow!("SUPABASE_JWT_SECRET environment variable is required"))?;

    Ok(Arc::new(TokenAuthProvider::new(
        config.auth.access_token.clone(),
        secret,
    )))
}
