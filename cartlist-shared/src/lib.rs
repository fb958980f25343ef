//! # Cartlist Shared Library
//!
//! Types and persistence code shared by the Cartlist engine and its tools.
//!
//! ## Module Organization
//!
//! - `models`: table models for profiles, roles, lists, categories and items,
//!   with their PostgreSQL queries
//! - `db`: connection pool and embedded migrations
//! - `auth`: access-token claims issued by the hosted auth service

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Cartlist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
