/// Item model, partial updates and database operations
///
/// Items live in exactly one list and optionally reference a category owned
/// by the list owner. The quantity is stored in the remote `amount` column.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE items (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (length(btrim(name)) > 0),
///     amount INTEGER NOT NULL DEFAULT 1 CHECK (amount >= 1),
///     category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
///     comment TEXT,
///     checked BOOLEAN NOT NULL DEFAULT FALSE,
///     sort_order INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// # Partial updates
///
/// [`ItemPatch`] carries only the fields a mutation touches. Applying a patch to
/// an [`Item`] returns the inverse patch (previous values of exactly those
/// fields), which is what optimistic rollback replays.
///
/// ```
/// use cartlist_shared::models::item::ItemPatch;
///
/// let patch = ItemPatch::checked(true);
/// assert_eq!(patch.fields().len(), 1);
/// assert!(patch.validate().is_ok());
/// assert!(ItemPatch::quantity(0).validate().is_err());
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Shopping list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Unique item ID
    pub id: Uuid,

    /// Owning list
    pub list_id: Uuid,

    /// Display name
    pub name: String,

    /// How many to buy (always >= 1)
    #[serde(rename = "amount")]
    #[sqlx(rename = "amount")]
    pub quantity: i32,

    /// Category, `None` when uncategorized
    pub category_id: Option<Uuid>,

    /// Free-form note
    pub comment: Option<String>,

    /// Whether the item is ticked off
    #[serde(default)]
    pub checked: bool,

    /// Display position within the list
    #[serde(default)]
    pub sort_order: i32,

    /// Insertion time
    pub created_at: DateTime<Utc>,
}

/// Input for creating an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateItem {
    /// Owning list
    pub list_id: Uuid,

    /// Item name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Quantity
    #[serde(rename = "amount")]
    #[validate(range(min = 1))]
    pub quantity: i32,

    /// Category
    pub category_id: Option<Uuid>,

    /// Optional note
    pub comment: Option<String>,

    /// Initial checked state
    #[serde(default)]
    pub checked: bool,

    /// Display position
    #[serde(default)]
    pub sort_order: i32,
}

/// Field of an item that a patch can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemField {
    Name,
    Quantity,
    Category,
    Comment,
    Checked,
    SortOrder,
}

impl ItemField {
    /// Every patchable field
    pub const ALL: [ItemField; 6] = [
        ItemField::Name,
        ItemField::Quantity,
        ItemField::Category,
        ItemField::Comment,
        ItemField::Checked,
        ItemField::SortOrder,
    ];

    /// Column name in the `items` table
    pub fn column(&self) -> &'static str {
        match self {
            ItemField::Name => "name",
            ItemField::Quantity => "amount",
            ItemField::Category => "category_id",
            ItemField::Comment => "comment",
            ItemField::Checked => "checked",
            ItemField::SortOrder => "sort_order",
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Reasons a patch is refused before it is applied anywhere
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemPatchError {
    /// Patch touches no field
    #[error("Patch does not change any field")]
    Empty,

    /// Name would become blank
    #[error("Item name cannot be empty")]
    EmptyName,

    /// Quantity below one
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),
}

/// Partial set of item field changes
///
/// `category_id` and `comment` are doubly optional: the outer `Option` says
/// whether the field is touched, the inner one is the new (nullable) value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "amount", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<Uuid>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl ItemPatch {
    pub fn checked(checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Default::default()
        }
    }

    pub fn quantity(quantity: i32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn comment(comment: Option<String>) -> Self {
        Self {
            comment: Some(comment),
            ..Default::default()
        }
    }

    pub fn category(category_id: Option<Uuid>) -> Self {
        Self {
            category_id: Some(category_id),
            ..Default::default()
        }
    }

    /// Fields this patch touches, in declaration order
    pub fn fields(&self) -> Vec<ItemField> {
        ItemField::ALL
            .into_iter()
            .filter(|field| self.touches(*field))
            .collect()
    }

    /// Whether the patch touches `field`
    pub fn touches(&self, field: ItemField) -> bool {
        match field {
            ItemField::Name => self.name.is_some(),
            ItemField::Quantity => self.quantity.is_some(),
            ItemField::Category => self.category_id.is_some(),
            ItemField::Comment => self.comment.is_some(),
            ItemField::Checked => self.checked.is_some(),
            ItemField::SortOrder => self.sort_order.is_some(),
        }
    }

    /// Returns true if no field is touched
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Copy of this patch restricted to `fields`
    pub fn only(&self, fields: &[ItemField]) -> Self {
        let keep = |field: ItemField| fields.contains(&field);
        Self {
            name: self.name.clone().filter(|_| keep(ItemField::Name)),
            quantity: self.quantity.filter(|_| keep(ItemField::Quantity)),
            category_id: self.category_id.filter(|_| keep(ItemField::Category)),
            comment: self.comment.clone().filter(|_| keep(ItemField::Comment)),
            checked: self.checked.filter(|_| keep(ItemField::Checked)),
            sort_order: self.sort_order.filter(|_| keep(ItemField::SortOrder)),
        }
    }

    /// Checks the values this patch would write
    ///
    /// # Errors
    ///
    /// - [`ItemPatchError::Empty`] if nothing is touched
    /// - [`ItemPatchError::EmptyName`] if the name is blank after trimming
    /// - [`ItemPatchError::InvalidQuantity`] if the quantity is below 1
    pub fn validate(&self) -> Result<(), ItemPatchError> {
        if self.is_empty() {
            return Err(ItemPatchError::Empty);
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ItemPatchError::EmptyName);
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 1 {
                return Err(ItemPatchError::InvalidQuantity(quantity));
            }
        }
        Ok(())
    }
}

impl Item {
    /// Applies `patch` and returns the inverse patch
    ///
    /// The inverse touches exactly the fields `patch` touches and holds their
    /// values from before the call, so `item.apply(&inverse)` restores them.
    pub fn apply(&mut self, patch: &ItemPatch) -> ItemPatch {
        let mut previous = ItemPatch::default();

        if let Some(name) = &patch.name {
            previous.name = Some(std::mem::replace(&mut self.name, name.clone()));
        }
        if let Some(quantity) = patch.quantity {
            previous.quantity = Some(std::mem::replace(&mut self.quantity, quantity));
        }
        if let Some(category_id) = patch.category_id {
            previous.category_id = Some(std::mem::replace(&mut self.category_id, category_id));
        }
        if let Some(comment) = &patch.comment {
            previous.comment = Some(std::mem::replace(&mut self.comment, comment.clone()));
        }
        if let Some(checked) = patch.checked {
            previous.checked = Some(std::mem::replace(&mut self.checked, checked));
        }
        if let Some(sort_order) = patch.sort_order {
            previous.sort_order = Some(std::mem::replace(&mut self.sort_order, sort_order));
        }

        previous
    }

    /// Creates an item
    pub async fn create(pool: &PgPool, data: CreateItem) -> Result<Self, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (list_id, name, amount, category_id, comment, checked, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, list_id, name, amount, category_id, comment, checked, sort_order, created_at
            "#,
        )
        .bind(data.list_id)
        .bind(data.name)
        .bind(data.quantity)
        .bind(data.category_id)
        .bind(data.comment)
        .bind(data.checked)
        .bind(data.sort_order)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    /// Inserts several items in a single statement
    ///
    /// The statement is atomic: either every row is inserted or none is.
    ///
    /// # Returns
    ///
    /// Number of rows inserted
    pub async fn create_many(pool: &PgPool, items: &[CreateItem]) -> Result<u64, sqlx::Error> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO items (list_id, name, amount, category_id, comment, checked, sort_order) ",
        );
        builder.push_values(items, |mut row, item| {
            row.push_bind(item.list_id)
                .push_bind(item.name.clone())
                .push_bind(item.quantity)
                .push_bind(item.category_id)
                .push_bind(item.comment.clone())
                .push_bind(item.checked)
                .push_bind(item.sort_order);
        });

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Finds an item by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, list_id, name, amount, category_id, comment, checked, sort_order, created_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Lists a list's items in display order
    pub async fn list_by_list(pool: &PgPool, list_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, list_id, name, amount, category_id, comment, checked, sort_order, created_at
            FROM items
            WHERE list_id = $1
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Applies a partial update
    ///
    /// Only the touched columns appear in the statement.
    ///
    /// # Returns
    ///
    /// The updated item, or `None` if no row matched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: &ItemPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        if patch.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE items SET ");
        let mut assignments = builder.separated(", ");

        if let Some(name) = &patch.name {
            assignments.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(quantity) = patch.quantity {
            assignments.push("amount = ").push_bind_unseparated(quantity);
        }
        if let Some(category_id) = patch.category_id {
            assignments.push("category_id = ").push_bind_unseparated(category_id);
        }
        if let Some(comment) = &patch.comment {
            assignments.push("comment = ").push_bind_unseparated(comment.clone());
        }
        if let Some(checked) = patch.checked {
            assignments.push("checked = ").push_bind_unseparated(checked);
        }
        if let Some(sort_order) = patch.sort_order {
            assignments.push("sort_order = ").push_bind_unseparated(sort_order);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(
            " RETURNING id, list_id, name, amount, category_id, comment, checked, sort_order, created_at",
        );

        let item = builder
            .build_query_as::<Item>()
            .fetch_optional(pool)
            .await?;

        Ok(item)
    }

    /// Deletes an item
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
