/// Remote data store seam
///
/// The engine never talks to the backend directly; it goes through the
/// [`RemoteStore`] trait so the same orchestration code runs against the hosted
/// REST API, a plain PostgreSQL database, or memory.
///
/// # Store Types
///
/// - **Rest**: hosted backend over HTTP, row-level security applies
/// - **Postgres**: direct sqlx access to the same schema
/// - **Memory**: in-process store with failure injection for tests and demos
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::store::{MemoryStore, RemoteStore};
/// use std::sync::Arc;
///
/// let store: Arc<dyn RemoteStore> = Arc::new(MemoryStore::new());
/// println!("Using {} store", store.name());
/// ```

pub mod memory;
pub mod postgres;
pub mod rest;
pub mod store_trait;

// Re-export main types
pub use memory::{FailurePlan, MemoryStore, Operation};
pub use postgres::PgStore;
pub use rest::{RestStore, RestStoreConfig};
pub use store_trait::{Collection, RemoteStore, StoreError, StoreResult};
