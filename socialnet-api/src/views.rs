/// View models handed to the page renderer
///
/// Every page endpoint answers with one of these as JSON. Form views echo the
/// non-secret fields back so a failed submission can be re-rendered with the
/// user's input intact; passwords are never echoed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use socialnet_shared::{
    accounts::Profile,
    feed::FeedResult,
    models::{Post, UserSummary, DEFAULT_AVATAR_URL},
    CoreError, FieldViolation, UserId,
};

/// Registration form
#[derive(Debug, Default, Serialize)]
pub struct RegisterView {
    pub username: String,
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl RegisterView {
    pub fn with_error(username: String, email: String, err: &CoreError) -> Self {
        let violations = match err {
            CoreError::Validation(v) => v.clone(),
            _ => Vec::new(),
        };

        Self {
            username,
            email,
            error: Some(err.to_string()),
            violations,
        }
    }
}

/// Login form
#[derive(Debug, Default, Serialize)]
pub struct LoginView {
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create-post form
#[derive(Debug, Default, Serialize)]
pub struct CreatePostView {
    pub content: String,
}

/// Friend feed page
#[derive(Debug, Serialize)]
pub struct PostsView {
    pub username: String,
    pub avatar_url: String,

    /// `status` is `no_friends` or `feed`
    #[serde(flatten)]
    pub feed: FeedResult,
}

/// A post on the profile page
#[derive(Debug, Serialize)]
pub struct ProfilePost {
    pub id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for ProfilePost {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            content: post.content,
            image_url: post.image_url,
            created_at: post.created_at,
        }
    }
}

/// Profile page
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: UserId,
    pub username: String,
    pub avatar_url: String,
    pub registration_date: DateTime<Utc>,
    pub post_count: i64,
    pub friend_count: i64,
    pub is_current_user: bool,
    pub no_posts: bool,
    pub posts: Vec<ProfilePost>,
}

impl ProfileView {
    pub fn new(
        profile: Profile,
        viewer: UserId,
        posts: Vec<Post>,
        post_count: i64,
        friend_count: i64,
    ) -> Self {
        Self {
            is_current_user: profile.id == viewer,
            id: profile.id,
            username: profile.username,
            avatar_url: profile.avatar_url,
            registration_date: profile.registered_at,
            post_count,
            friend_count,
            no_posts: posts.is_empty(),
            posts: posts.into_iter().map(ProfilePost::from).collect(),
        }
    }
}

/// A search hit on the find-friends page
#[derive(Debug, Serialize)]
pub struct FriendCandidate {
    pub id: UserId,
    pub username: String,
    pub avatar_url: String,
}

impl From<UserSummary> for FriendCandidate {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar_url: user
                .avatar_url
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
        }
    }
}

/// Find-friends page
#[derive(Debug, Serialize)]
pub struct FindFriendsView {
    pub name: String,
    pub results: Vec<FriendCandidate>,
}
