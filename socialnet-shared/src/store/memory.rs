/// In-memory store
///
/// Keeps the three tables in process behind a tokio `RwLock` and enforces the
/// same constraints as the Postgres schema, reporting them under the same
/// constraint names:
///
/// - `users_email_key`: unique email
/// - `friendships_pair_key`: one edge per unordered pair
/// - `friendships_no_self`: no self edges
/// - `friendships_user_id_fkey` / `friendships_friend_id_fkey` / `posts_user_id_fkey`
///
/// Every write takes the table lock for its whole check-and-insert, so
/// concurrent inserts of the same pair cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{SocialStore, StoreResult};
use crate::error::StoreError;
use crate::models::{CreatePost, CreateUser, FeedPost, Friendship, Post, User, UserId, UserSummary};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    friendships: Vec<Friendship>,
    posts: Vec<Post>,
    next_user_id: i64,
    next_post_id: i64,
}

impl Tables {
    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a post with an explicit timestamp
    pub async fn insert_post_at(
        &self,
        data: CreatePost,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;

        if tables.user(data.user_id).is_none() {
            return Err(StoreError::ForeignKeyViolation("posts_user_id_fkey".to_string()));
        }

        tables.next_post_id += 1;
        let post = Post {
            id: tables.next_post_id,
            user_id: data.user_id,
            content: data.content,
            image_url: data.image_url,
            created_at,
        };
        tables.posts.push(post.clone());

        Ok(post)
    }
}

fn newest_first(a_time: &DateTime<Utc>, a_id: i64, b_time: &DateTime<Utc>, b_id: i64) -> std::cmp::Ordering {
    b_time.cmp(a_time).then(b_id.cmp(&a_id))
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        tables.next_user_id += 1;
        let user = User {
            id: UserId(tables.next_user_id),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            avatar_url: None,
            registration_date: Utc::now(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.user(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn search_users(&self, pattern: &str, exclude: UserId) -> StoreResult<Vec<UserSummary>> {
        let needle = pattern.to_lowercase();
        let tables = self.tables.read().await;

        let mut found: Vec<UserSummary> = tables
            .users
            .iter()
            .filter(|u| u.id != exclude && u.username.to_lowercase().contains(&needle))
            .map(|u| UserSummary {
                id: u.id,
                username: u.username.clone(),
                avatar_url: u.avatar_url.clone(),
            })
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));

        Ok(found)
    }

    async fn update_avatar(&self, id: UserId, avatar_url: Option<String>) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.avatar_url = avatar_url;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn friendship_exists(&self, a: UserId, b: UserId) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.friendships.iter().any(|f| f.connects(a, b)))
    }

    async fn insert_friendship(&self, user_id: UserId, friend_id: UserId) -> StoreResult<Friendship> {
        let mut tables = self.tables.write().await;

        if user_id == friend_id {
            return Err(StoreError::CheckViolation("friendships_no_self".to_string()));
        }
        if tables.user(user_id).is_none() {
            return Err(StoreError::ForeignKeyViolation("friendships_user_id_fkey".to_string()));
        }
        if tables.user(friend_id).is_none() {
            return Err(StoreError::ForeignKeyViolation("friendships_friend_id_fkey".to_string()));
        }
        if tables.friendships.iter().any(|f| f.connects(user_id, friend_id)) {
            return Err(StoreError::UniqueViolation("friendships_pair_key".to_string()));
        }

        let friendship = Friendship {
            user_id,
            friend_id,
            created_at: Utc::now(),
        };
        tables.friendships.push(friendship.clone());

        Ok(friendship)
    }

    async fn count_friends(&self, user_id: UserId) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.friendships.iter().filter(|f| f.user_id == user_id).count() as i64)
    }

    async fn insert_post(&self, data: CreatePost) -> StoreResult<Post> {
        self.insert_post_at(data, Utc::now()).await
    }

    async fn friend_feed(&self, viewer: UserId, limit: i64) -> StoreResult<Vec<FeedPost>> {
        let tables = self.tables.read().await;

        let mut feed: Vec<FeedPost> = tables
            .posts
            .iter()
            .filter(|p| {
                tables
                    .friendships
                    .iter()
                    .any(|f| f.user_id == viewer && f.friend_id == p.user_id)
            })
            .filter_map(|p| {
                tables.user(p.user_id).map(|author| FeedPost {
                    post_id: p.id,
                    author_id: author.id,
                    author_username: author.username.clone(),
                    author_avatar_url: author.avatar_url.clone(),
                    content: p.content.clone(),
                    image_url: p.image_url.clone(),
                    created_at: p.created_at,
                })
            })
            .collect();

        feed.sort_by(|a, b| newest_first(&a.created_at, a.post_id, &b.created_at, b.post_id));
        feed.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(feed)
    }

    async fn posts_by_author(&self, author: UserId) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;

        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.user_id == author)
            .cloned()
            .collect();
        posts.sort_by(|a, b| newest_first(&a.created_at, a.id, &b.created_at, b.id));

        Ok(posts)
    }

    async fn count_posts(&self, author: UserId) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| p.user_id == author).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn user(store: &MemoryStore, name: &str) -> UserId {
        store
            .insert_user(CreateUser {
                username: name.to_string(),
                email: format!("{}@x.com", name),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_ids_are_generated_sequentially() {
        let store = MemoryStore::new();
        assert_eq!(user(&store, "alice").await, UserId(1));
        assert_eq!(user(&store, "bobby").await, UserId(2));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let store = MemoryStore::new();
        user(&store, "alice").await;

        let err = store
            .insert_user(CreateUser {
                username: "other".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::UniqueViolation(c) if c == "users_email_key"));
    }

    #[tokio::test]
    async fn test_friendship_constraints() {
        let store = MemoryStore::new();
        let a = user(&store, "alice").await;
        let b = user(&store, "bobby").await;

        store.insert_friendship(a, b).await.unwrap();

        assert!(matches!(
            store.insert_friendship(b, a).await,
            Err(StoreError::UniqueViolation(_))
        ));
        assert!(matches!(
            store.insert_friendship(a, a).await,
            Err(StoreError::CheckViolation(_))
        ));
        assert!(matches!(
            store.insert_friendship(a, UserId(99)).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
        assert!(store.friendship_exists(b, a).await.unwrap());
        assert_eq!(store.count_friends(a).await.unwrap(), 1);
        assert_eq!(store.count_friends(b).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_of_one_pair_yield_single_edge() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let a = user(&store, "alice").await;
        let b = user(&store, "bobby").await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
            handles.push(tokio::spawn(async move {
                store.insert_friendship(from, to).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(
            store.count_friends(a).await.unwrap() + store.count_friends(b).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_feed_ordering_and_limit() {
        let store = MemoryStore::new();
        let viewer = user(&store, "alice").await;
        let friend = user(&store, "bobby").await;
        store.insert_friendship(viewer, friend).await.unwrap();

        let base = Utc::now();
        for i in 0..5 {
            store
                .insert_post_at(
                    CreatePost {
                        user_id: friend,
                        content: format!("post {}", i),
                        image_url: None,
                    },
                    base + Duration::seconds(i),
                )
                .await
                .unwrap();
        }

        let feed = store.friend_feed(viewer, 3).await.unwrap();
        let contents: Vec<&str> = feed.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["post 4", "post 3", "post 2"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_break_ties_by_id() {
        let store = MemoryStore::new();
        let author = user(&store, "alice").await;
        let at = Utc::now();

        for content in ["first", "second"] {
            store
                .insert_post_at(
                    CreatePost {
                        user_id: author,
                        content: content.to_string(),
                        image_url: None,
                    },
                    at,
                )
                .await
                .unwrap();
        }

        let posts = store.posts_by_author(author).await.unwrap();
        assert_eq!(posts[0].content, "second");
        assert_eq!(posts[1].content, "first");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_excludes_caller() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        user(&store, "Alicia").await;
        user(&store, "bobby").await;

        let found = store.search_users("ALI", alice).await.unwrap();
        let names: Vec<&str> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["Alicia"]);

        assert!(store.search_users("zzz", alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_requires_existing_author() {
        let store = MemoryStore::new();
        let err = store
            .insert_post(CreatePost {
                user_id: UserId(5),
                content: "hello".to_string(),
                image_url: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }
}
