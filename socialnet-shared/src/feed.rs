/// Feed aggregation and post publishing
///
/// The friend feed follows outbound edges only: a viewer sees posts from the
/// users they added, not from users who added them. A viewer with no outbound
/// edges gets [`FeedResult::NoFriends`] rather than an empty feed, whether or
/// not anyone has posted.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult, StoreError};
use crate::models::{CreatePost, FeedPost, Post, UserId};
use crate::store::DynStore;

/// Posts per friend feed page
pub const DEFAULT_FEED_LIMIT: i64 = 10;

/// Outcome of [`FeedAggregator::build_feed`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedResult {
    /// The viewer has not added anyone
    NoFriends,

    /// Newest first, at most the requested limit
    Feed {
        posts: Vec<FeedPost>,

        /// Presentation hint: friends exist but none has posted
        no_posts: bool,
    },
}

impl FeedResult {
    pub fn posts(&self) -> &[FeedPost] {
        match self {
            FeedResult::NoFriends => &[],
            FeedResult::Feed { posts, .. } => posts,
        }
    }
}

/// Builds feeds and records new posts
#[derive(Clone)]
pub struct FeedAggregator {
    store: DynStore,
}

impl FeedAggregator {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Friend feed for `viewer`
    pub async fn build_feed(&self, viewer: UserId, limit: i64) -> CoreResult<FeedResult> {
        if limit <= 0 {
            return Err(CoreError::invalid("limit", "Feed limit must be positive"));
        }

        if self.store.count_friends(viewer).await? == 0 {
            debug!(user_id = %viewer, "Feed requested with no friends");
            return Ok(FeedResult::NoFriends);
        }

        let posts = self.store.friend_feed(viewer, limit).await?;
        let no_posts = posts.is_empty();

        Ok(FeedResult::Feed { posts, no_posts })
    }

    /// All of `author`'s own posts, newest first
    pub async fn build_profile_feed(&self, author: UserId) -> CoreResult<Vec<Post>> {
        Ok(self.store.posts_by_author(author).await?)
    }

    /// Records a post by `author`
    ///
    /// A post needs non-blank text or an image.
    pub async fn publish_post(
        &self,
        author: UserId,
        content: String,
        image_url: Option<String>,
    ) -> CoreResult<Post> {
        if content.trim().is_empty() && image_url.is_none() {
            return Err(CoreError::invalid("content", "Post must have text or an image"));
        }

        let post = self
            .store
            .insert_post(CreatePost {
                user_id: author,
                content,
                image_url,
            })
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation(_) => CoreError::NotFound("User"),
                other => CoreError::Store(other),
            })?;

        info!(user_id = %author, post_id = post.id, "Post created");

        Ok(post)
    }

    pub async fn post_count(&self, author: UserId) -> CoreResult<i64> {
        Ok(self.store.count_posts(author).await?)
    }
}
