//! # Cartlist Engine Library
//!
//! Client-side core of the Cartlist shopping-list app: first-time setup of new
//! accounts and optimistic editing of list items, on top of a remote store.
//!
//! ## Modules
//!
//! - `store`: remote store seam with REST, PostgreSQL and in-memory backends
//! - `auth`: source of the signed-in account
//! - `notify`: user-visible notices
//! - `seed`: starter list templates
//! - `setup`: first-time setup orchestrator
//! - `mutation`: optimistic item mutations with rollback
//! - `catalog`: list, category and settings operations
//! - `session`: profile, role and list loading after sign-in
//! - `view`: item filtering and grouping
//! - `config`: environment configuration
//!
//! ## Example
//!
//! ```no_run
//! use cartlist_engine::store::{MemoryStore, RemoteStore};
//!
//! # async fn example() {
//! let store = MemoryStore::new();
//! println!("Store: {}", store.name());
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod config;
pub mod mutation;
pub mod notify;
pub mod seed;
pub mod session;
pub mod setup;
pub mod store;
pub mod view;
