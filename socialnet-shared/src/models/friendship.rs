/// Friendship model and database operations
///
/// Rows are directed edges `user_id -> friend_id`. Duplicate checks look at both
/// orientations, the feed only follows outbound edges.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE friendships (
///     user_id    BIGINT      NOT NULL REFERENCES users (id),
///     friend_id  BIGINT      NOT NULL REFERENCES users (id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, friend_id),
///     CONSTRAINT friendships_no_self CHECK (user_id <> friend_id)
/// );
///
/// CREATE UNIQUE INDEX friendships_pair_key
///     ON friendships (LEAST(user_id, friend_id), GREATEST(user_id, friend_id));
/// ```
///
/// The unique index on the unordered pair is what keeps concurrent inserts for
/// the same pair from both succeeding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::user::UserId;

/// Directed friendship edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Friendship {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// True if this edge connects `a` and `b` in either orientation
    pub fn connects(&self, a: UserId, b: UserId) -> bool {
        (self.user_id == a && self.friend_id == b) || (self.user_id == b && self.friend_id == a)
    }

    /// Inserts the edge `user_id -> friend_id`
    ///
    /// # Errors
    ///
    /// - Unique violation if an edge already exists for the pair
    /// - Foreign key violation if either user is missing
    /// - Check violation if `user_id == friend_id`
    pub async fn create(
        pool: &PgPool,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<Self, sqlx::Error> {
        let friendship = sqlx::query_as::<_, Friendship>(
            r#"
            INSERT INTO friendships (user_id, friend_id)
            VALUES ($1, $2)
            RETURNING user_id, friend_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_one(pool)
        .await?;

        Ok(friendship)
    }

    /// Checks for an edge between `a` and `b` in either orientation
    pub async fn exists_between(pool: &PgPool, a: UserId, b: UserId) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM friendships
                WHERE (user_id = $1 AND friend_id = $2)
                   OR (user_id = $2 AND friend_id = $1)
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Counts outbound edges from `user_id`
    pub async fn count_outbound(pool: &PgPool, user_id: UserId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM friendships WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connects_either_orientation() {
        let edge = Friendship {
            user_id: UserId(1),
            friend_id: UserId(7),
            created_at: Utc::now(),
        };

        assert!(edge.connects(UserId(1), UserId(7)));
        assert!(edge.connects(UserId(7), UserId(1)));
        assert!(!edge.connects(UserId(1), UserId(2)));
    }
}
