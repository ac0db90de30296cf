/// Storage abstraction
///
/// Services reach the relational store only through [`SocialStore`]. Two
/// implementations exist:
///
/// - [`PgStore`]: PostgreSQL via sqlx, delegating to the model types
/// - [`MemoryStore`]: in-process tables with the same constraints, for tests
///   and local runs without a database
///
/// Implementations must enforce the uniqueness rules themselves (unique
/// email, one edge per unordered pair) and report violations as
/// [`StoreError::UniqueViolation`]; services rely on that rather than on
/// their own read-before-write checks.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use socialnet_shared::store::{DynStore, MemoryStore};
///
/// let store: DynStore = Arc::new(MemoryStore::new());
/// ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{CreatePost, CreateUser, FeedPost, Friendship, Post, User, UserId, UserSummary};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle to a store
pub type DynStore = Arc<dyn SocialStore>;

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Query and write primitives the core needs from the relational store
#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Round-trip to check the store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user; unique violation if the email is taken
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive substring match on username, excluding `exclude`
    async fn search_users(&self, pattern: &str, exclude: UserId) -> StoreResult<Vec<UserSummary>>;

    /// Returns false if the user doesn't exist
    async fn update_avatar(&self, id: UserId, avatar_url: Option<String>) -> StoreResult<bool>;

    /// Edge between `a` and `b` in either orientation
    async fn friendship_exists(&self, a: UserId, b: UserId) -> StoreResult<bool>;

    /// Inserts `user_id -> friend_id`
    ///
    /// Unique violation if the unordered pair already has an edge, foreign key
    /// violation if either user is missing, check violation on a self edge.
    async fn insert_friendship(&self, user_id: UserId, friend_id: UserId) -> StoreResult<Friendship>;

    /// Outbound edges from `user_id`
    async fn count_friends(&self, user_id: UserId) -> StoreResult<i64>;

    /// Foreign key violation if the author is missing
    async fn insert_post(&self, data: CreatePost) -> StoreResult<Post>;

    /// Posts by outbound friends of `viewer`, newest first, at most `limit`
    async fn friend_feed(&self, viewer: UserId, limit: i64) -> StoreResult<Vec<FeedPost>>;

    /// Posts by `author`, newest first, unbounded
    async fn posts_by_author(&self, author: UserId) -> StoreResult<Vec<Post>>;

    async fn count_posts(&self, author: UserId) -> StoreResult<i64>;
}
