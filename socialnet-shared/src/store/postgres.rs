/// PostgreSQL-backed store
///
/// Thin adapter from [`SocialStore`] to the model queries; the only logic here
/// is classifying sqlx errors into [`crate::error::StoreError`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::{SocialStore, StoreResult};
use crate::db::pool::health_check;
use crate::models::{CreatePost, CreateUser, FeedPost, Friendship, Post, User, UserId, UserSummary};

/// Store over a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn search_users(&self, pattern: &str, exclude: UserId) -> StoreResult<Vec<UserSummary>> {
        Ok(User::search_by_username(&self.pool, pattern, exclude).await?)
    }

    async fn update_avatar(&self, id: UserId, avatar_url: Option<String>) -> StoreResult<bool> {
        Ok(User::update_avatar(&self.pool, id, avatar_url).await?)
    }

    async fn friendship_exists(&self, a: UserId, b: UserId) -> StoreResult<bool> {
        Ok(Friendship::exists_between(&self.pool, a, b).await?)
    }

    async fn insert_friendship(&self, user_id: UserId, friend_id: UserId) -> StoreResult<Friendship> {
        Ok(Friendship::create(&self.pool, user_id, friend_id).await?)
    }

    async fn count_friends(&self, user_id: UserId) -> StoreResult<i64> {
        Ok(Friendship::count_outbound(&self.pool, user_id).await?)
    }

    async fn insert_post(&self, data: CreatePost) -> StoreResult<Post> {
        Ok(Post::create(&self.pool, data).await?)
    }

    async fn friend_feed(&self, viewer: UserId, limit: i64) -> StoreResult<Vec<FeedPost>> {
        Ok(Post::friend_feed(&self.pool, viewer, limit).await?)
    }

    async fn posts_by_author(&self, author: UserId) -> StoreResult<Vec<Post>> {
        Ok(Post::list_by_author(&self.pool, author).await?)
    }

    async fn count_posts(&self, author: UserId) -> StoreResult<i64> {
        Ok(Post::count_by_author(&self.pool, author).await?)
    }
}
