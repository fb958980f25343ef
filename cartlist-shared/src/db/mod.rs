/// Database layer
///
/// Direct PostgreSQL access for deployments that do not go through the hosted
/// backend's REST surface.
///
/// # Modules
///
/// - `pool`: connection pool with health checks
/// - `migrations`: embedded schema migrations
/// - Table queries live next to the models in the `models` module
///
/// # Example
///
/// ```no_run
/// use cartlist_shared::db::pool::{create_pool, DatabaseConfig};
/// use cartlist_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
