/// Social graph: friend search and friendship edges
///
/// Edges are directed rows but duplicates are judged on the unordered pair:
/// once `a -> b` exists, neither `a -> b` nor `b -> a` can be added. The
/// existence check in [`SocialGraph::add_friend`] only saves a round trip; the
/// store's unique index on the pair is what settles concurrent inserts.

use tracing::{debug, info};

use crate::error::{CoreError, CoreResult, StoreError};
use crate::models::{UserId, UserSummary};
use crate::store::DynStore;

const ALREADY_FRIENDS: &str = "Already friends";

/// Friendship graph operations
#[derive(Clone)]
pub struct SocialGraph {
    store: DynStore,
}

impl SocialGraph {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Case-insensitive substring search on username
    ///
    /// The caller is never in the result. A blank name matches nobody.
    pub async fn search(&self, name: &str, exclude: UserId) -> CoreResult<Vec<UserSummary>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.store.search_users(name, exclude).await?;
        debug!(matches = users.len(), "Friend search");

        Ok(users)
    }

    /// Adds the edge `user_id -> friend_id`
    ///
    /// # Errors
    ///
    /// - `Validation` if `friend_id <= 0` or it names the caller
    /// - `Conflict` if an edge exists in either orientation
    /// - `NotFound` if `friend_id` is not a user
    pub async fn add_friend(&self, user_id: UserId, friend_id: i64) -> CoreResult<()> {
        if friend_id <= 0 {
            return Err(CoreError::invalid("friend_id", "Invalid friend id"));
        }
        let friend_id = UserId(friend_id);
        if friend_id == user_id {
            return Err(CoreError::invalid("friend_id", "You cannot add yourself as a friend"));
        }

        if self.store.friendship_exists(user_id, friend_id).await? {
            return Err(CoreError::Conflict(ALREADY_FRIENDS.to_string()));
        }

        self.store
            .insert_friendship(user_id, friend_id)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => CoreError::Conflict(ALREADY_FRIENDS.to_string()),
                StoreError::ForeignKeyViolation(_) => CoreError::NotFound("User"),
                StoreError::CheckViolation(_) => {
                    CoreError::invalid("friend_id", "You cannot add yourself as a friend")
                }
                other => CoreError::Store(other),
            })?;

        info!(user_id = %user_id, friend_id = %friend_id, "Friendship created");

        Ok(())
    }

    /// Number of outbound edges
    pub async fn friend_count(&self, user_id: UserId) -> CoreResult<i64> {
        Ok(self.store.count_friends(user_id).await?)
    }
}
