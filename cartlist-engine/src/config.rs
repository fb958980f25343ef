/// Engine configuration
///
/// Loaded from environment variables, with a `.env` file picked up in
/// development.
///
/// # Environment Variables
///
/// - `CARTLIST_BACKEND`: `rest`, `postgres` or `memory` (default: rest)
/// - `SUPABASE_URL`: project URL (required for rest)
/// - `SUPABASE_ANON_KEY`: public anon key (required for rest)
/// - `HTTP_TIMEOUT_SECONDS`: REST request timeout (default: 30)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
/// - `SUPABASE_JWT_SECRET`: secret the access token is signed with
/// - `CARTLIST_ACCESS_TOKEN`: access token of the signed-in account
/// - `SETUP_POLICY`: `best_effort` or `strict` (default: best_effort)
/// - `SETUP_CHUNK_SIZE`: items per insert request (default: 50)
/// - `CONFLICT_POLICY`: `last_write_wins` or `revisioned` (default: last_write_wins)
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::config::EngineConfig;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = EngineConfig::from_env()?;
/// println!("Backend: {}", config.backend.name());
/// # Ok(())
/// # }
/// ```

use crate::mutation::{ConflictPolicy, MutationConfig};
use crate::setup::{SetupConfig, SetupPolicy, DEFAULT_CHUNK_SIZE};
use crate::store::RestStoreConfig;
use cartlist_shared::db::pool::DatabaseConfig;
use std::env;

/// Complete engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where data lives
    pub backend: BackendConfig,

    /// Access token handling
    pub auth: AuthConfig,

    /// First-time setup
    pub setup: SetupConfig,

    /// Optimistic mutations
    pub mutation: MutationConfig,
}

/// Remote store selection
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Hosted REST API
    Rest(RestStoreConfig),

    /// Direct PostgreSQL connection
    Postgres(DatabaseConfig),

    /// In-process store with a demo account
    Memory,
}

impl BackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            BackendConfig::Rest(_) => "rest",
            BackendConfig::Postgres(_) => "postgres",
            BackendConfig::Memory => "memory",
        }
    }
}

/// Access token configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Secret access tokens are signed with
    pub jwt_secret: Option<String>,

    /// Token of the signed-in account
    pub access_token: Option<String>,
}

impl EngineConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A variable required by the selected backend is missing
    /// - A variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup` instead of the process environment
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let access_token = var("CARTLIST_ACCESS_TOKEN");

        let backend = match var("CARTLIST_BACKEND")
            .unwrap_or_else(|| "rest".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "rest" => BackendConfig::Rest(RestStoreConfig {
                base_url: required("SUPABASE_URL")?,
                anon_key: required("SUPABASE_ANON_KEY")?,
                access_token: access_token.clone(),
                timeout_seconds: var("HTTP_TIMEOUT_SECONDS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse::<u64>()?,
            }),
            "postgres" => BackendConfig::Postgres(DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "5".to_string())
                    .parse::<u32>()?,
                ..Default::default()
            }),
            "memory" => BackendConfig::Memory,
            other => anyhow::bail!(
                "CARTLIST_BACKEND must be rest, postgres or memory, got '{}'",
                other
            ),
        };

        let policy = match var("SETUP_POLICY") {
            Some(value) => value.parse::<SetupPolicy>().map_err(anyhow::Error::msg)?,
            None => SetupPolicy::default(),
        };

        let chunk_size = var("SETUP_CHUNK_SIZE")
            .unwrap_or_else(|| DEFAULT_CHUNK_SIZE.to_string())
            .parse::<usize>()?;
        if chunk_size == 0 {
            anyhow::bail!("SETUP_CHUNK_SIZE must be at least 1");
        }

        let conflict_policy = match var("CONFLICT_POLICY") {
            Some(value) => value.parse::<ConflictPolicy>().map_err(anyhow::Error::msg)?,
            None => ConflictPolicy::default(),
        };

        Ok(Self {
            backend,
            auth: AuthConfig {
                jwt_secret: var("SUPABASE_JWT_SECRET"),
                access_token,
            },
            setup: SetupConfig { policy, chunk_size },
            mutation: MutationConfig { conflict_policy },
        })
    }
}
