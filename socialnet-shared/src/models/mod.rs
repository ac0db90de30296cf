/// Database models for Socialnet
///
/// Each model owns the SQL for its table. Services don't call these directly;
/// they go through [`crate::store::SocialStore`], whose Postgres implementation
/// delegates here.
///
/// # Models
///
/// - `user`: Accounts and credentials
/// - `friendship`: Directed friendship edges
/// - `post`: Posts and the joined feed row

pub mod friendship;
pub mod post;
pub mod user;

pub use friendship::Friendship;
pub use post::{CreatePost, FeedPost, Post};
pub use user::{CreateUser, User, UserId, UserSummary, DEFAULT_AVATAR_URL};
