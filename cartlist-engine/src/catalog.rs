/// List, category and settings operations
///
/// Everything here except category moves waits for the remote store before
/// touching local state. A failed call raises an error notice and returns the
/// store error.
///
/// # Category board
///
/// The catalog keeps the account's categories in display order. Moving a
/// category swaps it with its neighbour on the board immediately and then
/// writes both sort orders. If either write fails the board goes back to how
/// it was.
///
/// ```text
/// move_category(dairy, Up)
///
///   board: [bakery:0, dairy:1]  ->  [dairy:0, bakery:1]   (local, immediate)
///   update dairy.sort_order = 0
///   update bakery.sort_order = 1
///   any failure -> board: [bakery:0, dairy:1], notice
/// ```
///
/// Two categories with the same sort order cannot be swapped by exchanging
/// values, so both are first renumbered to `position * 10`.

use crate::notify::{Notice, Notifier};
use crate::seed::{Language, UnknownLanguage};
use crate::store::{RemoteStore, StoreError};
use cartlist_shared::models::{
    Category, CategoryPatch, CreateCategory, CreateList, Profile, ProfilePatch, ShoppingList,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Name is blank after trimming
    #[error("Name cannot be empty")]
    EmptyName,

    /// Input failed validation
    #[error("Invalid input: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// Language code not supported
    #[error(transparent)]
    UnsupportedLanguage(#[from] UnknownLanguage),

    /// Category is not on the board
    #[error("Category {0} is not loaded")]
    UnknownCategory(Uuid),

    /// Remote call failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Direction of a category move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Result of a category move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Both sort orders were written
    Moved,

    /// Already first (up) or last (down); nothing done
    AtEdge,

    /// A write failed and the board was restored
    Restored { error: StoreError },
}

/// Sort orders in `after` that differ from `before`, in board order
fn changed_orders(before: &[Category], after: &[Category]) -> Vec<(Uuid, i32)> {
    after
        .iter()
        .filter(|category| {
            before
                .iter()
                .find(|old| old.id == category.id)
                .map_or(true, |old| old.sort_order != category.sort_order)
        })
        .map(|category| (category.id, category.sort_order))
        .collect()
}

fn non_blank(name: &str) -> Result<String, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyName);
    }
    Ok(name.to_string())
}

/// Catalog operations for one account
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
    account_id: Uuid,
    board: Arc<Mutex<Vec<Category>>>,
}

impl Catalog {
    pub fn new(store: Arc<dyn RemoteStore>, notifier: Arc<dyn Notifier>, account_id: Uuid) -> Self {
        Self {
            store,
            notifier,
            account_id,
            board: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    fn board(&self) -> MutexGuard<'_, Vec<Category>> {
        self.board.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Category board poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Logs and raises a notice for a failed call
    fn failed(&self, action: &str, error: StoreError) -> CatalogError {
        warn!(account_id = %self.account_id, action, error = %error, "Catalog operation failed");
        self.notifier
            .notify(Notice::error(format!("Could not {}: {}", action, error)));
        CatalogError::Store(error)
    }

    /// Creates a list owned by the account
    pub async fn create_list(&self, name: &str) -> Result<ShoppingList, CatalogError> {
        let data = CreateList {
            name: non_blank(name)?,
            owner_id: self.account_id,
        };
        data.validate()?;

        let list = self
            .store
            .insert_list(data)
            .await
            .map_err(|e| self.failed("create list", e))?;

        info!(account_id = %self.account_id, list_id = %list.id, "Created list");
        Ok(list)
    }

    pub async fn rename_list(&self, list_id: Uuid, name: &str) -> Result<ShoppingList, CatalogError> {
        let name = non_blank(name)?;
        self.store
            .rename_list(list_id, &name)
            .await
            .map_err(|e| self.failed("rename list", e))
    }

    /// Deletes a list and, with it, its items
    pub async fn delete_list(&self, list_id: Uuid) -> Result<(), CatalogError> {
        self.store
            .delete_list(list_id)
            .await
            .map_err(|e| self.failed("delete list", e))?;

        info!(account_id = %self.account_id, list_id = %list_id, "Deleted list");
        Ok(())
    }

    /// Sets the account's display language
    pub async fn update_language(&self, code: &str) -> Result<Profile, CatalogError> {
        let language: Language = code.parse()?;
        let profile = self
            .store
            .update_profile(self.account_id, &ProfilePatch::language(language.as_str()))
            .await
            .map_err(|e| self.failed("save language", e))?;

        info!(account_id = %self.account_id, language = %language, "Updated language");
        Ok(profile)
    }

    /// Reloads the board from the store
    pub async fn load_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let mut categories = self
            .store
            .categories_for(self.account_id)
            .await
            .map_err(|e| self.failed("load categories", e))?;
        categories.sort_by(Category::display_cmp);

        *self.board() = categories.clone();
        Ok(categories)
    }

    /// The board in display order
    pub fn categories(&self) -> Vec<Category> {
        self.board().clone()
    }

    /// Creates a category after the current last one
    pub async fn create_category(&self, name: &str) -> Result<Category, CatalogError> {
        let sort_order = self
            .board()
            .iter()
            .map(|category| category.sort_order)
            .max()
            .map_or(0, |last| last.saturating_add(1));

        let data = CreateCategory {
            name: non_blank(name)?,
            owner_id: self.account_id,
            sort_order,
        };
        data.validate()?;

        let category = self
            .store
            .insert_category(data)
            .await
            .map_err(|e| self.failed("add category", e))?;

        let mut board = self.board();
        board.push(category.clone());
        board.sort_by(Category::display_cmp);
        Ok(category)
    }

    pub async fn rename_category(&self, category_id: Uuid, name: &str) -> Result<Category, CatalogError> {
        let name = non_blank(name)?;
        let category = self
            .store
            .update_category(category_id, &CategoryPatch::name(name))
            .await
            .map_err(|e| self.failed("rename category", e))?;

        if let Some(local) = self.board().iter_mut().find(|c| c.id == category_id) {
            local.name = category.name.clone();
        }
        Ok(category)
    }

    /// Deletes a category; its items become uncategorized
    pub async fn delete_category(&self, category_id: Uuid) -> Result<(), CatalogError> {
        self.store
            .delete_category(category_id)
            .await
            .map_err(|e| self.failed("delete category", e))?;

        self.board().retain(|c| c.id != category_id);
        Ok(())
    }

    /// Swaps a category with its neighbour
    ///
    /// The two sort orders are exchanged. When they are equal the whole board
    /// is renumbered to `index * 10` first, and every changed order is written.
    pub async fn move_category(
        &self,
        category_id: Uuid,
        direction: Direction,
    ) -> Result<MoveOutcome, CatalogError> {
        let (snapshot, writes) = {
            let mut board = self.board();
            let index = board
                .iter()
                .position(|c| c.id == category_id)
                .ok_or(CatalogError::UnknownCategory(category_id))?;
            let other_index = match direction {
                Direction::Up => index.checked_sub(1),
                Direction::Down => Some(index + 1).filter(|i| *i < board.len()),
            };
            let Some(other_index) = other_index else {
                return Ok(MoveOutcome::AtEdge);
            };

            let snapshot = board.clone();
            let tied = board[index].sort_order == board[other_index].sort_order;

            board.swap(index, other_index);
            if tied {
                for (position, category) in board.iter_mut().enumerate() {
                    category.sort_order = position as i32 * 10;
                }
            } else {
                let (a, b) = (board[index].sort_order, board[other_index].sort_order);
                board[index].sort_order = b;
                board[other_index].sort_order = a;
            }

            let writes = changed_orders(&snapshot, &board);
            (snapshot, writes)
        };

        debug!(
            category_id = %category_id,
            direction = ?direction,
            writes = writes.len(),
            "Moved category locally"
        );

        for (done, (id, sort_order)) in writes.iter().enumerate() {
            if let Err(error) = self
                .store
                .update_category(*id, &CategoryPatch::sort_order(*sort_order))
                .await
            {
                // Put earlier writes back so the remote order matches the restored board
                self.undo_orders(&snapshot, &writes[..done]).await;
                return Ok(self.restore_board(snapshot, error));
            }
        }

        Ok(MoveOutcome::Moved)
    }

    async fn undo_orders(&self, snapshot: &[Category], applied: &[(Uuid, i32)]) {
        for (id, _) in applied {
            let Some(original) = snapshot.iter().find(|c| c.id == *id) else {
                continue;
            };
            if let Err(e) = self
                .store
                .update_category(*id, &CategoryPatch::sort_order(original.sort_order))
                .await
            {
                warn!(category_id = %id, error = %e, "Failed to undo category move");
            }
        }
    }

    fn restore_board(&self, snapshot: Vec<Category>, error: StoreError) -> MoveOutcome {
        *self.board() = snapshot;
        warn!(account_id = %self.account_id, error = %error, "Category move failed, order restored");
        self.notifier
            .notify(Notice::error(format!("Could not move category: {}", error)));
        MoveOutcome::Restored { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  Snacks ").unwrap(), "Snacks");
        assert!(matches!(non_blank("   "), Err(CatalogError::EmptyName)));
    }

    #[test]
    fn test_unsupported_language_message() {
        let err = CatalogError::from("fr".parse::<Language>().unwrap_err());
        assert_eq!(err.to_string(), "Unsupported language: fr");
    }
}
