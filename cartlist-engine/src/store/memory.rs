/// In-memory store for testing and demos
///
/// Behaves like the hosted backend for everything the engine relies on:
///
/// - rows get server-side IDs and strictly increasing `created_at` stamps
/// - item names must be non-blank and quantities at least 1
/// - items must reference an existing list and, if any, an existing category
/// - deleting a list deletes its items; deleting a category uncategorizes its items
/// - the setup flag on a profile can only be turned on
///
/// On top of that it can be told to misbehave:
///
/// - [`MemoryStore::fail`] makes an operation return a transport error, always,
///   for the next `n` calls, or on specific call numbers
/// - [`MemoryStore::hold`] parks every call of an operation until
///   [`MemoryStore::release`] is called, so tests can observe state while a
///   remote call is in flight
/// - [`MemoryStore::reject_batches_over`] refuses bulk inserts above a size
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::store::{FailurePlan, MemoryStore, Operation, RemoteStore};
/// use cartlist_shared::models::CreateList;
/// use uuid::Uuid;
///
/// # async fn example() {
/// let store = MemoryStore::new();
/// let account = store.add_account(Some("en"));
///
/// store.fail(Operation::InsertList, FailurePlan::Next(1));
/// let first = store
///     .insert_list(CreateList { name: "Food".to_string(), owner_id: account })
///     .await;
/// assert!(first.is_err());
/// assert_eq!(store.calls(Operation::InsertList), 1);
/// # }
/// ```

use crate::store::{Collection, RemoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use cartlist_shared::models::{
    Category, CategoryPatch, CreateCategory, CreateItem, CreateList, Item, ItemPatch, Profile,
    ProfilePatch, Role, ShoppingList,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Store operation, used to target failures and gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchProfile,
    UpdateProfile,
    FetchRole,
    InsertList,
    ListLists,
    RenameList,
    DeleteList,
    InsertCategory,
    ListCategories,
    UpdateCategory,
    DeleteCategory,
    InsertItem,
    InsertItems,
    ListItems,
    UpdateItem,
    DeleteItem,
}

/// When an operation should fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePlan {
    /// Every call fails
    Always,

    /// The next `n` calls fail
    Next(usize),

    /// Calls with these 1-based numbers fail (counted since the store was created)
    OnCalls(Vec<usize>),
}

#[derive(Default)]
struct State {
    profiles: HashMap<Uuid, Profile>,
    roles: HashMap<Uuid, Role>,
    lists: HashMap<Uuid, ShoppingList>,
    shares: HashMap<Uuid, HashSet<Uuid>>,
    categories: HashMap<Uuid, Category>,
    items: HashMap<Uuid, Item>,
    calls: HashMap<Operation, usize>,
    failures: HashMap<Operation, FailurePlan>,
    batch_limit: Option<usize>,
    ticks: i64,
}

impl State {
    fn should_fail(&mut self, op: Operation, call: usize) -> bool {
        let Some(plan) = self.failures.get_mut(&op) else {
            return false;
        };

        match plan {
            FailurePlan::Always => true,
            FailurePlan::Next(remaining) => {
                *remaining -= 1;
                if *remaining == 0 {
                    self.failures.remove(&op);
                }
                true
            }
            FailurePlan::OnCalls(calls) => calls.contains(&call),
        }
    }

    fn check_item(
        &self,
        name: &str,
        quantity: i32,
        list_id: Uuid,
        category_id: Option<Uuid>,
    ) -> StoreResult<()> {
        if name.trim().is_empty() {
            return Err(StoreError::Rejected("items.name must not be blank".to_string()));
        }
        if quantity < 1 {
            return Err(StoreError::Rejected(format!(
                "items.amount must be at least 1, got {}",
                quantity
            )));
        }
        if !self.lists.contains_key(&list_id) {
            return Err(StoreError::Rejected(format!("list {} does not exist", list_id)));
        }
        if let Some(category_id) = category_id {
            if !self.categories.contains_key(&category_id) {
                return Err(StoreError::Rejected(format!(
                    "category {} does not exist",
                    category_id
                )));
            }
        }
        Ok(())
    }
}

/// In-memory store
pub struct MemoryStore {
    state: Mutex<State>,
    gates: Mutex<HashMap<Operation, Arc<Semaphore>>>,
    epoch: DateTime<Utc>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            gates: Mutex::new(HashMap::new()),
            epoch: Utc::now(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Memory store state poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn gates(&self) -> MutexGuard<'_, HashMap<Operation, Arc<Semaphore>>> {
        self.gates.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Memory store gates poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn now(state: &mut State, epoch: DateTime<Utc>) -> DateTime<Utc> {
        state.ticks += 1;
        epoch + Duration::microseconds(state.ticks)
    }

    /// Counts the call, waits at the gate, then applies any planned failure
    async fn enter(&self, op: Operation) -> StoreResult<()> {
        let call = {
            let mut state = self.state();
            let count = state.calls.entry(op).or_insert(0);
            *count += 1;
            *count
        };

        let gate = self.gates().get(&op).cloned();
        if let Some(gate) = gate {
            // Resolves once the gate is closed by `release`
            let _ = gate.acquire().await;
        }

        if self.state().should_fail(op, call) {
            tracing::debug!(operation = ?op, call, "Injecting store failure");
            return Err(StoreError::Transport(format!("injected {:?} failure", op)));
        }

        Ok(())
    }

    /// Registers an account with a profile and returns its ID
    pub fn add_account(&self, language: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.state();
        let created_at = Self::now(&mut state, self.epoch);
        state.profiles.insert(
            id,
            Profile {
                id,
                email: Some(format!("{}@example.com", id.simple())),
                language: language.map(str::to_string),
                initial_setup_completed: false,
                created_at,
            },
        );
        id
    }

    /// Inserts or replaces a profile row
    pub fn put_profile(&self, profile: Profile) {
        self.state().profiles.insert(profile.id, profile);
    }

    /// Removes a profile row
    pub fn remove_profile(&self, account_id: Uuid) {
        self.state().profiles.remove(&account_id);
    }

    /// Assigns a role
    pub fn set_role(&self, account_id: Uuid, role: Role) {
        self.state().roles.insert(account_id, role);
    }

    /// Makes a list visible to another account
    pub fn share_list(&self, list_id: Uuid, account_id: Uuid) {
        self.state()
            .shares
            .entry(account_id)
            .or_default()
            .insert(list_id);
    }

    /// Plans failures for an operation, replacing any earlier plan
    pub fn fail(&self, op: Operation, plan: FailurePlan) {
        let mut state = self.state();
        match plan {
            FailurePlan::Next(0) => {
                state.failures.remove(&op);
            }
            plan => {
                state.failures.insert(op, plan);
            }
        }
    }

    /// Removes every planned failure
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Refuses bulk inserts with more than `limit` rows
    pub fn reject_batches_over(&self, limit: usize) {
        self.state().batch_limit = Some(limit);
    }

    /// Parks calls of `op` until [`MemoryStore::release`]
    pub fn hold(&self, op: Operation) {
        self.gates()
            .entry(op)
            .or_insert_with(|| Arc::new(Semaphore::new(0)));
    }

    /// Lets parked and future calls of `op` through
    pub fn release(&self, op: Operation) {
        if let Some(gate) = self.gates().remove(&op) {
            gate.close();
        }
    }

    /// Number of calls of `op` so far, including parked and failed ones
    pub fn calls(&self, op: Operation) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    /// Yields until `op` has been called at least `count` times
    pub async fn wait_for_calls(&self, op: Operation, count: usize) {
        while self.calls(op) < count {
            tokio::task::yield_now().await;
        }
    }

    /// Stored profile
    pub fn profile(&self, account_id: Uuid) -> Option<Profile> {
        self.state().profiles.get(&account_id).cloned()
    }

    /// Every stored list, oldest first
    pub fn all_lists(&self) -> Vec<ShoppingList> {
        let mut lists: Vec<ShoppingList> = self.state().lists.values().cloned().collect();
        lists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        lists
    }

    /// Every stored category, in display order
    pub fn all_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.state().categories.values().cloned().collect();
        categories.sort_by(Category::display_cmp);
        categories
    }

    /// Every stored item, in insertion order
    pub fn all_items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.state().items.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        items
    }

    /// Stored item
    pub fn item(&self, item_id: Uuid) -> Option<Item> {
        self.state().items.get(&item_id).cloned()
    }

    fn sorted_lists<'a>(lists: impl Iterator<Item = &'a ShoppingList>) -> Vec<ShoppingList> {
        let mut lists: Vec<ShoppingList> = lists.cloned().collect();
        lists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        lists
    }

    fn build_item(state: &mut State, epoch: DateTime<Utc>, data: &CreateItem) -> Item {
        let created_at = Self::now(state, epoch);
        Item {
            id: Uuid::new_v4(),
            list_id: data.list_id,
            name: data.name.clone(),
            quantity: data.quantity,
            category_id: data.category_id,
            comment: data.comment.clone(),
            checked: data.checked,
            sort_order: data.sort_order,
            created_at,
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_profile(&self, account_id: Uuid) -> StoreResult<Profile> {
        self.enter(Operation::FetchProfile).await?;
        self.profile(account_id)
            .ok_or_else(|| StoreError::not_found(Collection::Profiles, account_id))
    }

    async fn update_profile(
        &self,
        account_id: Uuid,
        patch: &ProfilePatch,
    ) -> StoreResult<Profile> {
        self.enter(Operation::UpdateProfile).await?;
        let mut state = self.state();
        let profile = state
            .profiles
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::not_found(Collection::Profiles, account_id))?;
        profile.apply(patch);
        Ok(profile.clone())
    }

    async fn fetch_role(&self, account_id: Uuid) -> StoreResult<Option<Role>> {
        self.enter(Operation::FetchRole).await?;
        Ok(self.state().roles.get(&account_id).copied())
    }

    async fn insert_list(&self, data: CreateList) -> StoreResult<ShoppingList> {
        self.enter(Operation::InsertList).await?;
        if data.name.trim().is_empty() {
            return Err(StoreError::Rejected("lists.name must not be blank".to_string()));
        }

        let mut state = self.state();
        let created_at = Self::now(&mut state, self.epoch);
        let list = ShoppingList {
            id: Uuid::new_v4(),
            name: data.name,
            owner_id: data.owner_id,
            created_at,
        };
        state.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn lists_owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<ShoppingList>> {
        self.enter(Operation::ListLists).await?;
        let state = self.state();
        Ok(Self::sorted_lists(
            state.lists.values().filter(|list| list.owner_id == owner_id),
        ))
    }

    async fn visible_lists(&self, account_id: Uuid) -> StoreResult<Vec<ShoppingList>> {
        self.enter(Operation::ListLists).await?;
        let state = self.state();
        let shared = state.shares.get(&account_id);
        Ok(Self::sorted_lists(state.lists.values().filter(|list| {
            list.owner_id == account_id || shared.map_or(false, |ids| ids.contains(&list.id))
        })))
    }

    async fn rename_list(&self, list_id: Uuid, name: &str) -> StoreResult<ShoppingList> {
        self.enter(Operation::RenameList).await?;
        if name.trim().is_empty() {
            return Err(StoreError::Rejected("lists.name must not be blank".to_string()));
        }

        let mut state = self.state();
        let list = state
            .lists
            .get_mut(&list_id)
            .ok_or_else(|| StoreError::not_found(Collection::Lists, list_id))?;
        list.name = name.to_string();
        Ok(list.clone())
    }

    async fn delete_list(&self, list_id: Uuid) -> StoreResult<()> {
        self.enter(Operation::DeleteList).await?;
        let mut state = self.state();
        state
            .lists
            .remove(&list_id)
            .ok_or_else(|| StoreError::not_found(Collection::Lists, list_id))?;
        state.items.retain(|_, item| item.list_id != list_id);
        for ids in state.shares.values_mut() {
            ids.remove(&list_id);
        }
        Ok(())
    }

    async fn insert_category(&self, data: CreateCategory) -> StoreResult<Category> {
        self.enter(Operation::InsertCategory).await?;
        if data.name.trim().is_empty() {
            return Err(StoreError::Rejected(
                "categories.name must not be blank".to_string(),
            ));
        }

        let mut state = self.state();
        let created_at = Self::now(&mut state, self.epoch);
        let category = Category {
            id: Uuid::new_v4(),
            name: data.name,
            owner_id: data.owner_id,
            sort_order: data.sort_order,
            created_at,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn categories_for(&self, owner_id: Uuid) -> StoreResult<Vec<Category>> {
        self.enter(Operation::ListCategories).await?;
        let mut categories: Vec<Category> = self
            .state()
            .categories
            .values()
            .filter(|category| category.owner_id == owner_id)
            .cloned()
            .collect();
        categories.sort_by(Category::display_cmp);
        Ok(categories)
    }

    async fn update_category(
        &self,
        category_id: Uuid,
        patch: &CategoryPatch,
    ) -> StoreResult<Category> {
        self.enter(Operation::UpdateCategory).await?;
        if patch.name.as_deref().map_or(false, |name| name.trim().is_empty()) {
            return Err(StoreError::Rejected(
                "categories.name must not be blank".to_string(),
            ));
        }

        let mut state = self.state();
        let category = state
            .categories
            .get_mut(&category_id)
            .ok_or_else(|| StoreError::not_found(Collection::Categories, category_id))?;
        category.apply(patch);
        Ok(category.clone())
    }

    async fn delete_category(&self, category_id: Uuid) -> StoreResult<()> {
        self.enter(Operation::DeleteCategory).await?;
        let mut state = self.state();
        state
            .categories
            .remove(&category_id)
            .ok_or_else(|| StoreError::not_found(Collection::Categories, category_id))?;
        for item in state.items.values_mut() {
            if item.category_id == Some(category_id) {
                item.category_id = None;
            }
        }
        Ok(())
    }

    async fn insert_item(&self, data: CreateItem) -> StoreResult<Item> {
        self.enter(Operation::InsertItem).await?;
        let mut state = self.state();
        state.check_item(&data.name, data.quantity, data.list_id, data.category_id)?;

        let item = Self::build_item(&mut state, self.epoch, &data);
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn insert_items(&self, data: &[CreateItem]) -> StoreResult<u64> {
        self.enter(Operation::InsertItems).await?;
        let mut state = self.state();

        if let Some(limit) = state.batch_limit {
            if data.len() > limit {
                return Err(StoreError::Rejected(format!(
                    "batch of {} rows exceeds limit of {}",
                    data.len(),
                    limit
                )));
            }
        }
        for row in data {
            state.check_item(&row.name, row.quantity, row.list_id, row.category_id)?;
        }

        for row in data {
            let item = Self::build_item(&mut state, self.epoch, row);
            state.items.insert(item.id, item);
        }
        Ok(data.len() as u64)
    }

    async fn items_in_list(&self, list_id: Uuid) -> StoreResult<Vec<Item>> {
        self.enter(Operation::ListItems).await?;
        let mut items: Vec<Item> = self
            .state()
            .items
            .values()
            .filter(|item| item.list_id == list_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(items)
    }

    async fn update_item(&self, item_id: Uuid, patch: &ItemPatch) -> StoreResult<Item> {
        self.enter(Operation::UpdateItem).await?;
        let mut state = self.state();
        let mut updated = state
            .items
            .get(&item_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Collection::Items, item_id))?;
        updated.apply(patch);
        state.check_item(
            &updated.name,
            updated.quantity,
            updated.list_id,
            updated.category_id,
        )?;

        state.items.insert(item_id, updated.clone());
        Ok(updated)
    }

    async fn delete_item(&self, item_id: Uuid) -> StoreResult<()> {
        self.enter(Operation::DeleteItem).await?;
        self.state()
            .items
            .remove(&item_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(Collection::Items, item_id))
    }
}
