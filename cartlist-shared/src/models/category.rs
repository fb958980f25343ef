/// Category model and database operations
///
/// Categories belong to an account and are shown in ascending `sort_order`.
/// Equal sort orders fall back to creation order, so gaps and ties are fine.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
///     sort_order INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// Deleting a category leaves its items uncategorized
/// (`items.category_id ... ON DELETE SET NULL`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Item category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID
    pub id: Uuid,

    /// Display name, usually emoji-prefixed ("🥬 Vegetables")
    pub name: String,

    /// Owning account
    pub owner_id: Uuid,

    /// Display position, ascending
    pub sort_order: i32,

    /// Insertion time, breaks sort order ties
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategory {
    /// Category name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Owning account
    pub owner_id: Uuid,

    /// Display position
    pub sort_order: i32,
}

/// Partial category update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New display position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl CategoryPatch {
    /// Patch that only renames
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            sort_order: None,
        }
    }

    /// Patch that only moves
    pub fn sort_order(sort_order: i32) -> Self {
        Self {
            name: None,
            sort_order: Some(sort_order),
        }
    }
}

impl Category {
    /// Applies a patch to an in-memory copy
    pub fn apply(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
    }

    /// Display ordering: sort order, then insertion time
    pub fn display_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then(self.created_at.cmp(&other.created_at))
    }

    /// Creates a category
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, owner_id, sort_order)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner_id, sort_order, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.owner_id)
        .bind(data.sort_order)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Lists an account's categories in display order
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, owner_id, sort_order, created_at
            FROM categories
            WHERE owner_id = $1
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Applies a partial update
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: &CategoryPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                sort_order = COALESCE($3, sort_order)
            WHERE id = $1
            RETURNING id, name, owner_id, sort_order, created_at
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.sort_order)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Deletes a category; its items become uncategorized
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
