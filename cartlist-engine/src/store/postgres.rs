/// PostgreSQL-backed store
///
/// Talks to the shopping-list schema directly through the queries in
/// `cartlist_shared::models`. There is no row-level security here: the lists
/// visible to an account are the lists it owns.
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::store::{PgStore, RemoteStore};
/// use cartlist_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let profile = store.fetch_profile(Uuid::new_v4()).await;
/// # let _ = profile;
/// # Ok(())
/// # }
/// ```

use crate::store::{Collection, RemoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use cartlist_shared::models::{
    Category, CategoryPatch, CreateCategory, CreateItem, CreateList, Item, ItemPatch, Profile,
    ProfilePatch, Role, ShoppingList, UserRole,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn found<T>(row: Option<T>, collection: Collection, id: Uuid) -> StoreResult<T> {
    row.ok_or_else(|| StoreError::not_found(collection, id))
}

fn deleted(removed: bool, collection: Collection, id: Uuid) -> StoreResult<()> {
    if removed {
        Ok(())
    } else {
        Err(StoreError::not_found(collection, id))
    }
}

#[async_trait]
impl RemoteStore for PgStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn fetch_profile(&self, account_id: Uuid) -> StoreResult<Profile> {
        let profile = Profile::find_by_id(&self.pool, account_id).await?;
        found(profile, Collection::Profiles, account_id)
    }

    async fn update_profile(
        &self,
        account_id: Uuid,
        patch: &ProfilePatch,
    ) -> StoreResult<Profile> {
        let profile = Profile::apply_patch(&self.pool, account_id, patch).await?;
        found(profile, Collection::Profiles, account_id)
    }

    async fn fetch_role(&self, account_id: Uuid) -> StoreResult<Option<Role>> {
        Ok(UserRole::find_role(&self.pool, account_id).await?)
    }

    async fn insert_list(&self, data: CreateList) -> StoreResult<ShoppingList> {
        Ok(ShoppingList::create(&self.pool, data).await?)
    }

    async fn lists_owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<ShoppingList>> {
        Ok(ShoppingList::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn visible_lists(&self, account_id: Uuid) -> StoreResult<Vec<ShoppingList>> {
        self.lists_owned_by(account_id).await
    }

    async fn rename_list(&self, list_id: Uuid, name: &str) -> StoreResult<ShoppingList> {
        let list = ShoppingList::rename(&self.pool, list_id, name).await?;
        found(list, Collection::Lists, list_id)
    }

    async fn delete_list(&self, list_id: Uuid) -> StoreResult<()> {
        let removed = ShoppingList::delete(&self.pool, list_id).await?;
        deleted(removed, Collection::Lists, list_id)
    }

    async fn insert_category(&self, data: CreateCategory) -> StoreResult<Category> {
        Ok(Category::create(&self.pool, data).await?)
    }

    async fn categories_for(&self, owner_id: Uuid) -> StoreResult<Vec<Category>> {
        Ok(Category::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn update_category(
        &self,
        category_id: Uuid,
        patch: &CategoryPatch,
    ) -> StoreResult<Category> {
        let category = Category::update(&self.pool, category_id, patch).await?;
        found(category, Collection::Categories, category_id)
    }

    async fn delete_category(&self, category_id: Uuid) -> StoreResult<()> {
        let removed = Category::delete(&self.pool, category_id).await?;
        deleted(removed, Collection::Categories, category_id)
    }

    async fn insert_item(&self, data: CreateItem) -> StoreResult<Item> {
        Ok(Item::create(&self.pool, data).await?)
    }

    async fn insert_items(&self, data: &[CreateItem]) -> StoreResult<u64> {
        Ok(Item::create_many(&self.pool, data).await?)
    }

    async fn items_in_list(&self, list_id: Uuid) -> StoreResult<Vec<Item>> {
        Ok(Item::list_by_list(&self.pool, list_id).await?)
    }

    async fn update_item(&self, item_id: Uuid, patch: &ItemPatch) -> StoreResult<Item> {
        let item = Item::update(&self.pool, item_id, patch).await?;
        found(item, Collection::Items, item_id)
    }

    async fn delete_item(&self, item_id: Uuid) -> StoreResult<()> {
        let removed = Item::delete(&self.pool, item_id).await?;
        deleted(removed, Collection::Items, item_id)
    }
}
