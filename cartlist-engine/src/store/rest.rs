/// Hosted backend store over its REST surface
///
/// The hosted backend exposes each table at `{url}/rest/v1/{table}` with
/// PostgREST query syntax (`?id=eq.<uuid>&order=created_at.asc`). Requests
/// carry the project's anon key in the `apikey` header and the signed-in
/// account's access token as the bearer token, so row-level security sees the
/// right account.
///
/// Writes ask for `Prefer: return=representation`; an update or delete that
/// matches no visible row comes back as an empty array, which this store
/// reports as `StoreError::NotFound`.
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::store::{RemoteStore, RestStore, RestStoreConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = RestStore::new(RestStoreConfig {
///     base_url: "https://project.supabase.co".to_string(),
///     anon_key: "anon-key".to_string(),
///     access_token: Some("user-access-token".to_string()),
///     timeout_seconds: 10,
/// })?;
///
/// let lists = store.visible_lists(Uuid::new_v4()).await?;
/// # let _ = lists;
/// # Ok(())
/// # }
/// ```

use crate::store::{Collection, RemoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use cartlist_shared::models::{
    Category, CategoryPatch, CreateCategory, CreateItem, CreateList, Item, ItemPatch, Profile,
    ProfilePatch, Role, ShoppingList, UserRole,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// REST store configuration
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project URL, e.g. `https://project.supabase.co`
    pub base_url: String,

    /// Public anon key
    pub anon_key: String,

    /// Access token of the signed-in account; the anon key is used when absent
    pub access_token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Store backed by the hosted REST API
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    bearer: String,
}

/// PostgREST equality filter value
fn eq(value: impl Display) -> String {
    format!("eq.{}", value)
}

/// Maps a non-success response to a store error
fn status_error(status: StatusCode, body: &str) -> StoreError {
    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    };

    if status.is_client_error() {
        StoreError::Rejected(message)
    } else {
        StoreError::Transport(message)
    }
}

/// First row of a representation, or not-found
fn single<T>(rows: Vec<T>, collection: Collection, id: Uuid) -> StoreResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found(collection, id))
}

impl RestStore {
    /// Builds the HTTP client
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` if the client cannot be built
    pub fn new(config: RestStoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let bearer = config
            .access_token
            .unwrap_or_else(|| config.anon_key.clone());

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key,
            bearer,
        })
    }

    /// Endpoint URL of a collection
    pub fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.as_str())
    }

    fn request(&self, method: Method, collection: Collection) -> RequestBuilder {
        self.client
            .request(method, self.table_url(collection))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
    }

    fn writing(&self, method: Method, collection: Collection) -> RequestBuilder {
        self.request(method, collection)
            .header("Prefer", "return=representation")
    }

    /// Sends a request and decodes the returned rows
    async fn rows<T: DeserializeOwned + Send>(
        &self,
        collection: Collection,
        builder: RequestBuilder,
    ) -> StoreResult<Vec<T>> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(collection = %collection, status = %status, "Backend request failed");
            return Err(status_error(status, &body));
        }

        let rows = response.json::<Vec<T>>().await?;
        debug!(collection = %collection, rows = rows.len(), "Backend request succeeded");
        Ok(rows)
    }

    /// Patches one row by ID and returns it
    async fn patch_by_id<T, B>(&self, collection: Collection, id: Uuid, body: &B) -> StoreResult<T>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized,
    {
        let builder = self
            .writing(Method::PATCH, collection)
            .query(&[("id", eq(id))])
            .json(body);
        let rows = self.rows(collection, builder).await?;
        single(rows, collection, id)
    }

    /// Deletes one row by ID
    async fn delete_by_id<T: DeserializeOwned + Send>(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> StoreResult<()> {
        let builder = self
            .writing(Method::DELETE, collection)
            .query(&[("id", eq(id))]);
        let rows: Vec<T> = self.rows(collection, builder).await?;
        single(rows, collection, id).map(|_| ())
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    fn name(&self) -> &str {
        "rest"
    }

    async fn fetch_profile(&self, account_id: Uuid) -> StoreResult<Profile> {
        let builder = self
            .request(Method::GET, Collection::Profiles)
            .query(&[("id", eq(account_id)), ("select", "*".to_string())]);
        let rows = self.rows(Collection::Profiles, builder).await?;
        single(rows, Collection::Profiles, account_id)
    }

    async fn update_profile(
        &self,
        account_id: Uuid,
        patch: &ProfilePatch,
    ) -> StoreResult<Profile> {
        let builder = self
            .writing(Method::PATCH, Collection::Profiles)
            .query(&[("id", eq(account_id))])
            .json(patch);
        let rows = self.rows(Collection::Profiles, builder).await?;
        single(rows, Collection::Profiles, account_id)
    }

    async fn fetch_role(&self, account_id: Uuid) -> StoreResult<Option<Role>> {
        let builder = self
            .request(Method::GET, Collection::UserRoles)
            .query(&[("user_id", eq(account_id)), ("select", "user_id,role".to_string())]);
        let rows: Vec<UserRole> = self.rows(Collection::UserRoles, builder).await?;
        Ok(rows.into_iter().next().map(|row| row.role))
    }

    async fn insert_list(&self, data: CreateList) -> StoreResult<ShoppingList> {
        let owner_id = data.owner_id;
        let builder = self.writing(Method::POST, Collection::Lists).json(&data);
        let rows = self.rows(Collection::Lists, builder).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("No list returned for owner {}", owner_id)))
    }

    async fn lists_owned_by(&self, owner_id: Uuid) -> StoreResult<Vec<ShoppingList>> {
        let builder = self.request(Method::GET, Collection::Lists).query(&[
            ("owner_id", eq(owner_id)),
            ("order", "created_at.asc,id.asc".to_string()),
        ]);
        self.rows(Collection::Lists, builder).await
    }

    async fn visible_lists(&self, _account_id: Uuid) -> StoreResult<Vec<ShoppingList>> {
        // Row-level security restricts the result to lists the bearer may see
        let builder = self
            .request(Method::GET, Collection::Lists)
            .query(&[("order", "created_at.asc,id.asc")]);
        self.rows(Collection::Lists, builder).await
    }

    async fn rename_list(&self, list_id: Uuid, name: &str) -> StoreResult<ShoppingList> {
        let body = serde_json::json!({ "name": name });
        self.patch_by_id(Collection::Lists, list_id, &body).await
    }

    async fn delete_list(&self, list_id: Uuid) -> StoreResult<()> {
        self.delete_by_id::<ShoppingList>(Collection::Lists, list_id)
            .await
    }

    async fn insert_category(&self, data: CreateCategory) -> StoreResult<Category> {
        let name = data.name.clone();
        let builder = self.writing(Method::POST, Collection::Categories).json(&data);
        let rows = self.rows(Collection::Categories, builder).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("No category returned for {}", name)))
    }

    async fn categories_for(&self, owner_id: Uuid) -> StoreResult<Vec<Category>> {
        let builder = self.request(Method::GET, Collection::Categories).query(&[
            ("owner_id", eq(owner_id)),
            ("order", "sort_order.asc,created_at.asc".to_string()),
        ]);
        self.rows(Collection::Categories, builder).await
    }

    async fn update_category(
        &self,
        category_id: Uuid,
        patch: &CategoryPatch,
    ) -> StoreResult<Category> {
        self.patch_by_id(Collection::Categories, category_id, patch)
            .await
    }

    async fn delete_category(&self, category_id: Uuid) -> StoreResult<()> {
        self.delete_by_id::<Category>(Collection::Categories, category_id)
            .await
    }

    async fn insert_item(&self, data: CreateItem) -> StoreResult<Item> {
        let name = data.name.clone();
        let builder = self.writing(Method::POST, Collection::Items).json(&data);
        let rows = self.rows(Collection::Items, builder).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("No item returned for {}", name)))
    }

    async fn insert_items(&self, data: &[CreateItem]) -> StoreResult<u64> {
        if data.is_empty() {
            return Ok(0);
        }

        let builder = self.writing(Method::POST, Collection::Items).json(data);
        let rows: Vec<Item> = self.rows(Collection::Items, builder).await?;
        Ok(rows.len() as u64)
    }

    async fn items_in_list(&self, list_id: Uuid) -> StoreResult<Vec<Item>> {
        let builder = self.request(Method::GET, Collection::Items).query(&[
            ("list_id", eq(list_id)),
            ("order", "sort_order.asc,created_at.asc".to_string()),
        ]);
        self.rows(Collection::Items, builder).await
    }

    async fn update_item(&self, item_id: Uuid, patch: &ItemPatch) -> StoreResult<Item> {
        self.patch_by_id(Collection::Items, item_id, patch).await
    }

    async fn delete_item(&self, item_id: Uuid) -> StoreResult<()> {
        self.delete_by_id::<Item>(Collection::Items, item_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(access_token: Option<&str>) -> RestStore {
        RestStore::new(RestStoreConfig {
            base_url: "https://demo.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
            access_token: access_token.map(str::to_string),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let store = store(None);
        assert_eq!(
            store.table_url(Collection::Items),
            "https://demo.supabase.co/rest/v1/items"
        );
        assert_eq!(
            store.table_url(Collection::UserRoles),
            "https://demo.supabase.co/rest/v1/user_roles"
        );
    }

    #[test]
    fn test_bearer_falls_back_to_anon_key() {
        assert_eq!(store(None).bearer, "anon");
        assert_eq!(store(Some("user-token")).bearer, "user-token");
    }

    #[test]
    fn test_request_headers() {
        let request = store(Some("user-token"))
            .writing(Method::PATCH, Collection::Items)
            .query(&[("id", eq(Uuid::nil()))])
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer user-token");
        assert_eq!(request.headers()["prefer"], "return=representation");
        assert_eq!(
            request.url().query(),
            Some("id=eq.00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn test_status_error_mapping() {
        let rejected = status_error(StatusCode::CONFLICT, "duplicate key");
        assert_eq!(
            rejected,
            StoreError::Rejected("409 Conflict: duplicate key".to_string())
        );

        let transport = status_error(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(transport, StoreError::Transport(_)));
    }

    #[test]
    fn test_single_reports_missing_row() {
        let id = Uuid::new_v4();
        let err = single::<Item>(Vec::new(), Collection::Items, id).unwrap_err();
        assert!(err.is_not_found());
    }
}
