#![allow(dead_code)]

/// Common test utilities for engine integration tests
///
/// Everything runs against the in-memory store:
/// - a fresh account with a profile
/// - an auth provider for that account
/// - a notifier whose notices the test can read back

use cartlist_engine::auth::{AuthProvider, StaticAuthProvider};
use cartlist_engine::notify::{ChannelNotifier, Notice};
use cartlist_engine::setup::{SetupConfig, SetupOrchestrator};
use cartlist_engine::store::{MemoryStore, RemoteStore};
use cartlist_shared::auth::AuthUser;
use cartlist_shared::models::{CreateItem, CreateList, Item, Profile, ShoppingList};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

/// Test context for one account
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub account_id: Uuid,
    pub notifier: Arc<ChannelNotifier>,
    pub notices: UnboundedReceiver<Notice>,
}

impl TestContext {
    /// Account with the given display language and no sign-up language
    pub fn new(language: Option<&str>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let account_id = store.add_account(language);
        let (notifier, notices) = ChannelNotifier::new();

        Self {
            store,
            account_id,
            notifier: Arc::new(notifier),
            notices,
        }
    }

    pub fn auth(&self, signup_language: Option<&str>) -> Arc<dyn AuthProvider> {
        Arc::new(StaticAuthProvider::new(AuthUser {
            id: self.account_id,
            email: None,
            signup_language: signup_language.map(str::to_string),
        }))
    }

    pub fn orchestrator(&self, config: SetupConfig) -> SetupOrchestrator {
        SetupOrchestrator::with_config(self.store.clone(), self.auth(None), config)
    }

    pub fn profile(&self) -> Profile {
        self.store
            .profile(self.account_id)
            .expect("test account has a profile")
    }

    pub async fn list(&self, name: &str) -> ShoppingList {
        self.store
            .insert_list(CreateList {
                name: name.to_string(),
                owner_id: self.account_id,
            })
            .await
            .expect("list insert")
    }

    pub async fn item(&self, list_id: Uuid, name: &str, quantity: i32) -> Item {
        self.store
            .insert_item(CreateItem {
                list_id,
                name: name.to_string(),
                quantity,
                category_id: None,
                comment: None,
                checked: false,
                sort_order: 0,
            })
            .await
            .expect("item insert")
    }

    /// Notices raised so far
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            notices.push(notice);
        }
        notices
    }
}
