/// Optimistic item mutations
///
/// The controller keeps the items of the open list in memory. A mutation is
/// applied to that local copy right away, then written to the remote store.
/// If the write fails, the fields the mutation touched are put back and the
/// user gets an error notice.
///
/// # Lifecycle of a mutation
///
/// ```text
/// mutate(item, patch)
///   ├─> validate patch, find item         (refused: nothing changes)
///   ├─> apply to local copy, keep previous values of touched fields
///   ├─> store.update_item(item, patch)
///   │     ├─ ok    -> Applied
///   │     └─ error -> restore previous values, notify -> RolledBack
///   └─> previous values dropped
/// ```
///
/// # Conflicts
///
/// Two mutations of the same field can be in flight at once. Under
/// [`ConflictPolicy::LastWriteWins`] a failed mutation always restores the
/// values it saw, even if a later mutation has changed the field since. Under
/// [`ConflictPolicy::Revisioned`] each local field write is stamped with a
/// revision, and a failed mutation only restores fields it still owns.
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::mutation::{MutationController, MutationOutcome};
/// use cartlist_engine::notify::TracingNotifier;
/// use cartlist_engine::store::MemoryStore;
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # async fn example(list_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let controller = MutationController::new(Arc::new(MemoryStore::new()), Arc::new(TracingNotifier));
/// let items = controller.load_items(list_id).await?;
///
/// if let Some(first) = items.first() {
///     match controller.toggle_checked(first.id).await? {
///         MutationOutcome::RolledBack { error, .. } => eprintln!("Toggle failed: {}", error),
///         _ => {}
///     }
/// }
/// # Ok(())
/// # }
/// ```

use crate::notify::{Notice, Notifier};
use crate::store::{RemoteStore, StoreError};
use cartlist_shared::models::{CreateItem, Item, ItemField, ItemPatch, ItemPatchError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

/// How a failed mutation treats fields changed again after it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Restore the captured values unconditionally
    #[default]
    LastWriteWins,

    /// Restore only fields no later mutation has written
    Revisioned,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::LastWriteWins => "last_write_wins",
            ConflictPolicy::Revisioned => "revisioned",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_write_wins" | "last-write-wins" => Ok(ConflictPolicy::LastWriteWins),
            "revisioned" => Ok(ConflictPolicy::Revisioned),
            other => Err(format!(
                "Unknown conflict policy '{}', expected last_write_wins or revisioned",
                other
            )),
        }
    }
}

/// Mutation controller configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationConfig {
    pub conflict_policy: ConflictPolicy,
}

/// Result of a mutation whose remote write was attempted (or not needed)
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The remote write succeeded; holds the row the store returned
    Applied(Item),

    /// Nothing to change, no remote call made
    Unchanged,

    /// The remote write failed and these fields were restored locally
    RolledBack {
        reverted: Vec<ItemField>,
        error: StoreError,
    },
}

impl MutationOutcome {
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, MutationOutcome::RolledBack { .. })
    }
}

/// Mutation errors
///
/// Optimistic mutations only fail before anything is applied. Remote failures
/// of optimistic writes are reported as [`MutationOutcome::RolledBack`].
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The item is not in the local collection
    #[error("Item {0} is not loaded")]
    UnknownItem(Uuid),

    /// The patch would write invalid values
    #[error("Invalid change: {0}")]
    InvalidPatch(#[from] ItemPatchError),

    /// A new item failed validation
    #[error("Invalid item: {0}")]
    InvalidItem(#[from] validator::ValidationErrors),

    /// A non-optimistic remote call failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

struct LocalItem {
    item: Item,
    revisions: HashMap<ItemField, u64>,
}

#[derive(Default)]
struct LocalItems {
    items: Vec<LocalItem>,
    next_revision: u64,
}

impl LocalItems {
    fn find_mut(&mut self, item_id: Uuid) -> Option<&mut LocalItem> {
        self.items.iter_mut().find(|local| local.item.id == item_id)
    }
}

/// A mutation applied locally whose remote write is outstanding
struct Pending {
    item_id: Uuid,
    patch: ItemPatch,
    previous: ItemPatch,
    revision: u64,
}

/// Applies item mutations optimistically
///
/// Cloning is cheap; clones share the same local items.
#[derive(Clone)]
pub struct MutationController {
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
    local: Arc<Mutex<LocalItems>>,
    config: MutationConfig,
}

impl MutationController {
    pub fn new(store: Arc<dyn RemoteStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, MutationConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn Notifier>,
        config: MutationConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            local: Arc::new(Mutex::new(LocalItems::default())),
            config,
        }
    }

    fn local(&self) -> MutexGuard<'_, LocalItems> {
        self.local.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Local item state poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Snapshot of the local items
    pub fn items(&self) -> Vec<Item> {
        self.local()
            .items
            .iter()
            .map(|local| local.item.clone())
            .collect()
    }

    /// Local copy of one item
    pub fn item(&self, item_id: Uuid) -> Option<Item> {
        self.local()
            .items
            .iter()
            .find(|local| local.item.id == item_id)
            .map(|local| local.item.clone())
    }

    /// Replaces the local items with the given list's items
    pub async fn load_items(&self, list_id: Uuid) -> Result<Vec<Item>, MutationError> {
        let items = match self.store.items_in_list(list_id).await {
            Ok(items) => items,
            Err(e) => {
                warn!(list_id = %list_id, error = %e, "Failed to load items");
                self.notifier.notify(Notice::error("Could not load items"));
                return Err(e.into());
            }
        };

        debug!(list_id = %list_id, count = items.len(), "Loaded items");
        self.local().items = items
            .iter()
            .cloned()
            .map(|item| LocalItem {
                item,
                revisions: HashMap::new(),
            })
            .collect();

        Ok(items)
    }

    /// Applies `patch` locally and spawns the remote write
    ///
    /// The local copy is updated before this returns. The handle resolves to
    /// the outcome once the remote write settles; dropping it does not cancel
    /// the write. Must be called within a tokio runtime.
    pub fn dispatch(
        &self,
        item_id: Uuid,
        patch: ItemPatch,
    ) -> Result<JoinHandle<MutationOutcome>, MutationError> {
        patch.validate()?;
        let pending = self.begin(item_id, |_| patch)?;
        let controller = self.clone();

        Ok(tokio::spawn(async move {
            match pending {
                Some(pending) => controller.settle(pending).await,
                None => MutationOutcome::Unchanged,
            }
        }))
    }

    /// Applies `patch` locally and waits for the remote write
    pub async fn mutate(
        &self,
        item_id: Uuid,
        patch: ItemPatch,
    ) -> Result<MutationOutcome, MutationError> {
        patch.validate()?;
        self.run(item_id, |_| patch).await
    }

    /// Flips the checked state
    pub async fn toggle_checked(&self, item_id: Uuid) -> Result<MutationOutcome, MutationError> {
        self.run(item_id, |item| ItemPatch::checked(!item.checked))
            .await
    }

    /// Adds one to the quantity
    pub async fn increment_quantity(
        &self,
        item_id: Uuid,
    ) -> Result<MutationOutcome, MutationError> {
        self.run(item_id, |item| ItemPatch::quantity(item.quantity.saturating_add(1)))
            .await
    }

    /// Takes one from the quantity; does nothing at 1
    pub async fn decrement_quantity(
        &self,
        item_id: Uuid,
    ) -> Result<MutationOutcome, MutationError> {
        self.run(item_id, |item| {
            if item.quantity > 1 {
                ItemPatch::quantity(item.quantity - 1)
            } else {
                ItemPatch::default()
            }
        })
        .await
    }

    /// Applies the fields of `changes` that differ from the local item
    ///
    /// The name is trimmed first. Fields equal to the current values are
    /// dropped; if none remain no remote call is made.
    pub async fn edit(
        &self,
        item_id: Uuid,
        mut changes: ItemPatch,
    ) -> Result<MutationOutcome, MutationError> {
        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_string();
        }
        if !changes.is_empty() {
            changes.validate()?;
        }

        self.run(item_id, |item| {
            let mut patch = changes;
            if patch.name.as_deref() == Some(item.name.as_str()) {
                patch.name = None;
            }
            if patch.quantity == Some(item.quantity) {
                patch.quantity = None;
            }
            if patch.category_id == Some(item.category_id) {
                patch.category_id = None;
            }
            if patch.comment.as_ref() == Some(&item.comment) {
                patch.comment = None;
            }
            if patch.checked == Some(item.checked) {
                patch.checked = None;
            }
            if patch.sort_order == Some(item.sort_order) {
                patch.sort_order = None;
            }
            patch
        })
        .await
    }

    /// Creates an item remotely, then appends it locally
    pub async fn add_item(&self, data: CreateItem) -> Result<Item, MutationError> {
        data.validate()?;

        match self.store.insert_item(data).await {
            Ok(item) => {
                debug!(item_id = %item.id, list_id = %item.list_id, "Added item");
                self.local().items.push(LocalItem {
                    item: item.clone(),
                    revisions: HashMap::new(),
                });
                Ok(item)
            }
            Err(e) => {
                warn!(error = %e, "Failed to add item");
                self.notifier.notify(Notice::error("Could not add item"));
                Err(e.into())
            }
        }
    }

    /// Deletes an item remotely, then removes it locally
    pub async fn delete_item(&self, item_id: Uuid) -> Result<(), MutationError> {
        match self.store.delete_item(item_id).await {
            Ok(()) => {
                self.local().items.retain(|local| local.item.id != item_id);
                debug!(item_id = %item_id, "Deleted item");
                Ok(())
            }
            Err(e) => {
                warn!(item_id = %item_id, error = %e, "Failed to delete item");
                self.notifier.notify(Notice::error("Could not delete item"));
                Err(e.into())
            }
        }
    }

    async fn run<F>(&self, item_id: Uuid, build: F) -> Result<MutationOutcome, MutationError>
    where
        F: FnOnce(&Item) -> ItemPatch,
    {
        match self.begin(item_id, build)? {
            Some(pending) => Ok(self.settle(pending).await),
            None => Ok(MutationOutcome::Unchanged),
        }
    }

    /// Builds the patch from the current local item and applies it, under one lock
    ///
    /// Returns `None` when the built patch changes nothing.
    fn begin<F>(&self, item_id: Uuid, build: F) -> Result<Option<Pending>, MutationError>
    where
        F: FnOnce(&Item) -> ItemPatch,
    {
        let mut local = self.local();
        local.next_revision += 1;
        let revision = local.next_revision;

        let entry = local
            .find_mut(item_id)
            .ok_or(MutationError::UnknownItem(item_id))?;

        let patch = build(&entry.item);
        if patch.is_empty() {
            return Ok(None);
        }
        patch.validate()?;

        let previous = entry.item.apply(&patch);
        for field in patch.fields() {
            entry.revisions.insert(field, revision);
        }

        debug!(
            item_id = %item_id,
            revision,
            fields = ?patch.fields(),
            "Applied mutation locally"
        );

        Ok(Some(Pending {
            item_id,
            patch,
            previous,
            revision,
        }))
    }

    /// Performs the remote write and rolls back on failure
    async fn settle(&self, pending: Pending) -> MutationOutcome {
        match self.store.update_item(pending.item_id, &pending.patch).await {
            Ok(item) => MutationOutcome::Applied(item),
            Err(error) => {
                let reverted = self.roll_back(&pending);
                warn!(
                    item_id = %pending.item_id,
                    revision = pending.revision,
                    reverted = ?reverted,
                    error = %error,
                    "Remote update failed, rolled back"
                );
                self.notifier
                    .notify(Notice::error(format!("Could not save change: {}", error)));
                MutationOutcome::RolledBack { reverted, error }
            }
        }
    }

    fn roll_back(&self, pending: &Pending) -> Vec<ItemField> {
        let mut local = self.local();
        let Some(entry) = local.find_mut(pending.item_id) else {
            debug!(item_id = %pending.item_id, "Item gone before rollback");
            return Vec::new();
        };

        let fields: Vec<ItemField> = match self.config.conflict_policy {
            ConflictPolicy::LastWriteWins => pending.previous.fields(),
            ConflictPolicy::Revisioned => pending
                .previous
                .fields()
                .into_iter()
                .filter(|field| entry.revisions.get(field) == Some(&pending.revision))
                .collect(),
        };

        if !fields.is_empty() {
            entry.item.apply(&pending.previous.only(&fields));
        }
        fields
    }
}
