/// Account roles
///
/// Roles come from the `user_roles` table. An account without a row is a
/// regular user.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE app_role AS ENUM ('user', 'admin');
///
/// CREATE TABLE user_roles (
///     user_id UUID PRIMARY KEY REFERENCES profiles(id) ON DELETE CASCADE,
///     role app_role NOT NULL DEFAULT 'user'
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account
    #[default]
    User,

    /// Administrator
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `user_roles` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: Role,
}

impl UserRole {
    /// Looks up an account's role, `None` when no row exists
    pub async fn find_role(pool: &PgPool, user_id: Uuid) -> Result<Option<Role>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRole>(
            "SELECT user_id, role FROM user_roles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|r| r.role))
    }

    /// Assigns a role, replacing any existing one
    pub async fn assign(pool: &PgPool, user_id: Uuid, role: Role) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRole>(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING user_id, role
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }
}
