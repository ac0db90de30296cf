//! # Socialnet Shared Library
//!
//! This crate contains the identity, social graph and feed logic used by the
//! Socialnet API server.
//!
//! ## Module Organization
//!
//! - `error`: Domain error taxonomy
//! - `auth`: Password hashing, session tokens and the request guard
//! - `db`: Connection pool and migrations
//! - `models`: Database models and their queries
//! - `store`: Storage abstraction (Postgres and in-memory)
//! - `accounts`: Registration, credential checks and profiles
//! - `graph`: Friend search and friendship edges
//! - `feed`: Friend feed, profile feed and post publishing

pub mod accounts;
pub mod auth;
pub mod db;
pub mod error;
pub mod feed;
pub mod graph;
pub mod models;
pub mod store;

pub use error::{CoreError, CoreResult, ErrorKind, FieldViolation, StoreError};
pub use models::user::UserId;

/// Current version of the Socialnet shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
