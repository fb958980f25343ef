/// Remote data store contract
///
/// Every read and write the engine performs against the shopping-list backend
/// goes through [`RemoteStore`]. Implementations exist for the hosted REST
/// surface, for a directly reachable PostgreSQL database, and for an in-memory
/// store used by tests and demos.
///
/// # Collections
///
/// The store exposes five collections ([`Collection`]): `profiles`,
/// `user_roles`, `lists`, `categories` and `items`. Row-level visibility
/// (which lists an account may see) is enforced by the backing store and is
/// opaque to callers.
///
/// # Errors
///
/// Every operation returns a [`StoreError`]. Callers that need to react to a
/// missing row use [`StoreError::is_not_found`]; everything else is treated as
/// a failed write or read.
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::store::{MemoryStore, RemoteStore};
/// use cartlist_shared::models::CreateList;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let account = Uuid::new_v4();
///
/// let list = store
///     .insert_list(CreateList { name: "Food".to_string(), owner_id: account })
///     .await?;
/// assert_eq!(store.lists_owned_by(account).await?.len(), 1);
/// # let _ = list;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use cartlist_shared::models::{
    Category, CategoryPatch, CreateCategory, CreateItem, CreateList, Item, ItemPatch, Profile,
    ProfilePatch, Role, ShoppingList,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Remote collection (table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Profiles,
    UserRoles,
    Lists,
    Categories,
    Items,
}

impl Collection {
    /// Table name in the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::UserRoles => "user_roles",
            Collection::Lists => "lists",
            Collection::Categories => "categories",
            Collection::Items => "items",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No row with this ID is visible to the caller
    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: Uuid },

    /// The backend refused the write (constraint, permission, validation)
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// The request never produced a usable response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Database driver error
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Creates a not-found error
    pub fn not_found(collection: Collection, id: Uuid) -> Self {
        StoreError::NotFound { collection, id }
    }

    /// Whether the row was missing (as opposed to the call failing)
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Class 23: integrity constraint violation
            sqlx::Error::Database(db_err)
                if db_err.code().map_or(false, |code| code.starts_with("23")) =>
            {
                StoreError::Rejected(db_err.message().to_string())
            }
            sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => {
                StoreError::Decode(err.to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => StoreError::Transport(err.to_string()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote data store
///
/// Single-row reads and writes return `StoreError::NotFound` when no row with
/// the given ID is visible. Listing operations return rows in display order.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the store name, used in logs
    fn name(&self) -> &str;

    /// Loads an account's profile
    async fn fetch_profile(&self, account_id: Uuid) -> StoreResult<Profile>;

    /// Applies a partial profile update and returns the stored row
    async fn update_profile(&self, account_id: Uuid, patch: &ProfilePatch)
        -> StoreResult<Profile>;

    /// Loads an account's role, `None` when the account has no role row
    async fn fetch_role(&self, account_id: Uuid) -> StoreResult<Option<Role>>;

    /// Creates a list
    async fn insert_list(&self, data: CreateList) -> StoreResult<ShoppingList>;

    /// Lists owned by an account, oldest first
    async fn lists_owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<ShoppingList>>;

    /// Lists visible to an account (owned or shared), oldest first
    async fn visible_lists(&self, account_id: Uuid) -> StoreResult<Vec<ShoppingList>>;

    /// Renames a list
    async fn rename_list(&self, list_id: Uuid, name: &str) -> StoreResult<ShoppingList>;

    /// Deletes a list together with its items
    async fn delete_list(&self, list_id: Uuid) -> StoreResult<()>;

    /// Creates a category
    async fn insert_category(&self, data: CreateCategory) -> StoreResult<Category>;

    /// Categories owned by an account, in display order
    async fn categories_for(&self, owner_id: Uuid) -> StoreResult<Vec<Category>>;

    /// Applies a partial category update
    async fn update_category(&self, category_id: Uuid, patch: &CategoryPatch)
        -> StoreResult<Category>;

    /// Deletes a category; its items become uncategorized
    async fn delete_category(&self, category_id: Uuid) -> StoreResult<()>;

    /// Creates an item
    async fn insert_item(&self, data: CreateItem) -> StoreResult<Item>;

    /// Creates several items in one request
    ///
    /// Either every row is written or none is. Returns the number of rows.
    async fn insert_items(&self, data: &[CreateItem]) -> StoreResult<u64>;

    /// Items of a list, in display order
    async fn items_in_list(&self, list_id: Uuid) -> StoreResult<Vec<Item>>;

    /// Applies a partial item update
    async fn update_item(&self, item_id: Uuid, patch: &ItemPatch) -> StoreResult<Item>;

    /// Deletes an item
    async fn delete_item(&self, item_id: Uuid) -> StoreResult<()>;
}
