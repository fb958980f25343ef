/// Profile model and database operations
///
/// A profile is the application-side view of an authenticated account. The row
/// is created by the auth provider (a trigger on sign-up in the hosted backend),
/// so this module mostly reads it and applies partial updates.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY,
///     email TEXT,
///     language VARCHAR(8),
///     initial_setup_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Setup flag
///
/// `initial_setup_completed` only ever moves from `false` to `true`. The update
/// path ORs the stored value with the requested one, so no patch can reset it.
///
/// # Example
///
/// ```no_run
/// use cartlist_shared::models::profile::{Profile, ProfilePatch};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, id: Uuid) -> Result<(), sqlx::Error> {
/// if let Some(profile) = Profile::find_by_id(&pool, id).await? {
///     if !profile.initial_setup_completed {
///         Profile::apply_patch(&pool, id, &ProfilePatch::setup_completed()).await?;
///     }
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// Account ID (same as the auth provider's user ID)
    pub id: Uuid,

    /// Email address copied from the auth record
    pub email: Option<String>,

    /// Display language code (e.g. "en", "no", "lt")
    pub language: Option<String>,

    /// Whether first-time setup has run for this account
    #[serde(default)]
    pub initial_setup_completed: bool,

    /// When the profile row was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a profile row
///
/// Only used where this workspace owns the schema (self-hosted database, tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    /// Account ID from the auth provider
    pub id: Uuid,

    /// Email address
    pub email: Option<String>,

    /// Initial display language
    pub language: Option<String>,
}

/// Partial profile update
///
/// Serializes to the column set the remote `profiles` table expects. The setup
/// flag is a one-way marker: it serializes as `initial_setup_completed: true`
/// when set and is omitted otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePatch {
    /// New display language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Mark first-time setup as completed
    #[serde(
        rename = "initial_setup_completed",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub mark_setup_completed: bool,
}

impl ProfilePatch {
    /// Patch that only marks setup as completed
    pub fn setup_completed() -> Self {
        Self {
            language: None,
            mark_setup_completed: true,
        }
    }

    /// Patch that only changes the display language
    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            mark_setup_completed: false,
        }
    }

    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && !self.mark_setup_completed
    }
}

impl Profile {
    /// Applies a patch to an in-memory copy, honouring the one-way setup flag
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(language) = &patch.language {
            self.language = Some(language.clone());
        }
        self.initial_setup_completed |= patch.mark_setup_completed;
    }

    /// Creates a profile row
    ///
    /// # Errors
    ///
    /// Returns an error if the ID already exists or the database operation fails
    pub async fn create(pool: &PgPool, data: CreateProfile) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, language)
            VALUES ($1, $2, $3)
            RETURNING id, email, language, initial_setup_completed, created_at
            "#,
        )
        .bind(data.id)
        .bind(data.email)
        .bind(data.language)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }

    /// Finds a profile by account ID
    ///
    /// Returns `None` when the row is not (yet) visible, which happens right
    /// after sign-up while the provisioning trigger has not committed.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, language, initial_setup_completed, created_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Applies a partial update
    ///
    /// The setup flag is OR-ed with the stored value so it can never revert.
    ///
    /// # Returns
    ///
    /// The updated profile, or `None` if no row matched
    pub async fn apply_patch(
        pool: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET language = COALESCE($2, language),
                initial_setup_completed = initial_setup_completed OR $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, language, initial_setup_completed, created_at
            "#,
        )
        .bind(id)
        .bind(patch.language.as_deref())
        .bind(patch.mark_setup_completed)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: Some("ana@example.com".to_string()),
            language: Some("lt".to_string()),
            initial_setup_completed: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_setup_flag_never_reverts() {
        let mut profile = sample();
        profile.apply(&ProfilePatch::setup_completed());
        assert!(profile.initial_setup_completed);

        profile.apply(&ProfilePatch::default());
        assert!(profile.initial_setup_completed);

        profile.apply(&ProfilePatch::language("no"));
        assert!(profile.initial_setup_completed);
        assert_eq!(profile.language.as_deref(), Some("no"));
    }

    #[test]
    fn test_patch_serialization_omits_unset_fields() {
        let json = serde_json::to_value(ProfilePatch::setup_completed()).unwrap();
        assert_eq!(json, serde_json::json!({ "initial_setup_completed": true }));

        let json = serde_json::to_value(ProfilePatch::language("en")).unwrap();
        assert_eq!(json, serde_json::json!({ "language": "en" }));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProfilePatch::default().is_empty());
        assert!(!ProfilePatch::setup_completed().is_empty());
    }
}
