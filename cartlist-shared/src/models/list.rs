/// Shopping list model and database operations
///
/// A list is owned by exactly one account. Other accounts may see it through
/// sharing rules enforced by the backing store; those rules are opaque here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting a list deletes its items (`items.list_id ... ON DELETE CASCADE`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShoppingList {
    /// Unique list ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Owning account
    pub owner_id: Uuid,

    /// When the list was created (display order)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateList {
    /// List name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Owning account
    pub owner_id: Uuid,
}

impl ShoppingList {
    /// Creates a list
    pub async fn create(pool: &PgPool, data: CreateList) -> Result<Self, sqlx::Error> {
        let list = sqlx::query_as::<_, ShoppingList>(
            r#"
            INSERT INTO lists (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(list)
    }

    /// Finds a list by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let list = sqlx::query_as::<_, ShoppingList>(
            "SELECT id, name, owner_id, created_at FROM lists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    /// Lists the lists owned by an account, oldest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let lists = sqlx::query_as::<_, ShoppingList>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM lists
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(lists)
    }

    /// Counts the lists owned by an account
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lists WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Renames a list
    pub async fn rename(pool: &PgPool, id: Uuid, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let list = sqlx::query_as::<_, ShoppingList>(
            r#"
            UPDATE lists
            SET name = $2
            WHERE id = $1
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    /// Deletes a list and, through the foreign key, its items
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_list_validation() {
        let ok = CreateList {
            name: "Food".to_string(),
            owner_id: Uuid::new_v4(),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateList {
            name: String::new(),
            owner_id: Uuid::new_v4(),
        };
        assert!(empty.validate().is_err());
    }
}
