/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Session token issuing and validation (HS256 JWT)
/// - [`middleware`]: Axum session guard that turns a token into an [`middleware::AuthContext`]
///
/// # Example
///
/// ```no_run
/// use socialnet_shared::auth::password::{hash_password, verify_password};
/// use socialnet_shared::auth::token::TokenIssuer;
/// use socialnet_shared::UserId;
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("pass1")?;
/// assert!(verify_password("pass1", &hash)?);
///
/// let issuer = TokenIssuer::new("test-secret-key-at-least-32-bytes-long", Duration::hours(24));
/// let issued = issuer.issue(UserId(1))?;
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod token;
