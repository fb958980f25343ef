/// Session loading
///
/// Right after sign-up the profile row can lag behind the auth record, so the
/// loader retries a missing profile a few times before giving up. Any other
/// store error ends the load at once.

use crate::store::{RemoteStore, StoreError};
use cartlist_shared::models::{Profile, Role, ShoppingList};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Delays between profile attempts
pub const PROFILE_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_millis(500),
    Duration::from_millis(1000),
    Duration::from_millis(2000),
];

/// Everything the app needs after sign-in
#[derive(Debug, Clone, PartialEq)]
pub struct AppData {
    pub profile: Profile,
    pub role: Role,

    /// Lists the account can see, oldest first
    pub lists: Vec<ShoppingList>,
}

/// Fetches the profile, retrying while it does not exist yet
pub async fn load_profile(store: &dyn RemoteStore, account_id: Uuid) -> Result<Profile, StoreError> {
    let mut delays = PROFILE_RETRY_DELAYS.iter();

    loop {
        match store.fetch_profile(account_id).await {
            Ok(profile) => return Ok(profile),
            Err(e) if e.is_not_found() => match delays.next() {
                Some(delay) => {
                    debug!(
                        account_id = %account_id,
                        delay_ms = delay.as_millis() as u64,
                        "Profile not visible yet, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
                None => {
                    warn!(account_id = %account_id, "Profile still missing after retries");
                    return Err(e);
                }
            },
            Err(e) => return Err(e),
        }
    }
}

/// Loads profile, role and visible lists
pub async fn load_app_data(store: &dyn RemoteStore, account_id: Uuid) -> Result<AppData, StoreError> {
    let profile = load_profile(store, account_id).await?;
    let role = store.fetch_role(account_id).await?.unwrap_or_default();
    let lists = store.visible_lists(account_id).await?;

    info!(
        account_id = %account_id,
        role = role.as_str(),
        lists = lists.len(),
        setup_completed = profile.initial_setup_completed,
        "Loaded session"
    );

    Ok(AppData {
        profile,
        role,
        lists,
    })
}
