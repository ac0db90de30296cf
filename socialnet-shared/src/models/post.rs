/// Post model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     id         BIGSERIAL PRIMARY KEY,
///     user_id    BIGINT      NOT NULL REFERENCES users (id),
///     content    TEXT        NOT NULL,
///     image_url  VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Listings are newest first; `id` breaks timestamp ties so ordering is stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::user::UserId;

/// Post row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,

    /// Author
    pub user_id: UserId,

    pub content: String,

    /// Attachment reference, if an image was uploaded
    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
    pub user_id: UserId,
    pub content: String,
    pub image_url: Option<String>,
}

/// Post joined with its author, as shown in the friend feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedPost {
    pub post_id: i64,
    pub author_id: UserId,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Inserts a post stamped with the current time
    pub async fn create(pool: &PgPool, data: CreatePost) -> Result<Self, sqlx::Error> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, content, image_url, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, user_id, content, image_url, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.content)
        .bind(data.image_url)
        .fetch_one(pool)
        .await?;

        Ok(post)
    }

    /// All posts by one author, newest first, unbounded
    pub async fn list_by_author(pool: &PgPool, author: UserId) -> Result<Vec<Self>, sqlx::Error> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, content, image_url, created_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(author)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }

    /// Counts posts by one author
    pub async fn count_by_author(pool: &PgPool, author: UserId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(author)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Newest posts authored by users `viewer` has an outbound edge to
    pub async fn friend_feed(
        pool: &PgPool,
        viewer: UserId,
        limit: i64,
    ) -> Result<Vec<FeedPost>, sqlx::Error> {
        let posts = sqlx::query_as::<_, FeedPost>(
            r#"
            SELECT p.id         AS post_id,
                   p.user_id    AS author_id,
                   u.username   AS author_username,
                   u.avatar_url AS author_avatar_url,
                   p.content,
                   p.image_url,
                   p.created_at
            FROM posts p
            JOIN friendships f ON p.user_id = f.friend_id
            JOIN users u ON p.user_id = u.id
            WHERE f.user_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2
            "#,
        )
        .bind(viewer)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }
}
