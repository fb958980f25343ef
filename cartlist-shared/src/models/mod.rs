/// Data models for the shopping-list backend
///
/// Each model mirrors one table of the hosted backend and carries the
/// PostgreSQL queries used when the database is reached directly.
///
/// # Models
///
/// - `profile`: account profile and the one-way setup flag
/// - `user_role`: per-account role
/// - `list`: shopping lists
/// - `category`: per-account item categories
/// - `item`: list items and partial updates
///
/// # Example
///
/// ```no_run
/// use cartlist_shared::models::list::{CreateList, ShoppingList};
/// use cartlist_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let list = ShoppingList::create(&pool, CreateList {
///     name: "Food".to_string(),
///     owner_id: Uuid::new_v4(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod category;
pub mod item;
pub mod list;
pub mod profile;
pub mod user_role;

pub use category::{Category, CategoryPatch, CreateCategory};
pub use item::{CreateItem, Item, ItemField, ItemPatch, ItemPatchError};
pub use list::{CreateList, ShoppingList};
pub use profile::{CreateProfile, Profile, ProfilePatch};
pub use user_role::{Role, UserRole};
