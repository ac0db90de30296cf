/// Route handlers, grouped by page
///
/// - `health`: Index and health check
/// - `auth`: Registration, login, bearer tokens, logout
/// - `posts`: Friend feed and post creation
/// - `profile`: Own profile and avatar upload
/// - `friends`: Friend search and adding friends

pub mod auth;
pub mod friends;
pub mod health;
pub mod posts;
pub mod profile;
