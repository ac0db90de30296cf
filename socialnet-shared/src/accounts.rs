/// Account service: registration, credential checks and profiles
///
/// Email uniqueness is enforced by the store (`users_email_key`); this service
/// never looks an email up before inserting, it translates the store's unique
/// violation into [`CoreError::Conflict`].
///
/// Password hashing is CPU-bound and runs on the blocking thread pool.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use socialnet_shared::accounts::{Accounts, Registration};
/// use socialnet_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let accounts = Accounts::new(Arc::new(MemoryStore::new()));
///
/// let id = accounts
///     .register(Registration {
///         username: "alice".to_string(),
///         email: "a@x.com".to_string(),
///         password: "pass1".to_string(),
///     })
///     .await?;
///
/// assert_eq!(accounts.verify_credentials("a@x.com", "pass1").await?, id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::error::{CoreError, CoreResult, FieldViolation, StoreError};
use crate::models::{CreateUser, UserId};
use crate::store::DynStore;

/// Registration input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 4, max = 20, message = "Username must be between 4 and 20 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 255, message = "Email must be between 1 and 255 characters"))]
    pub email: String,

    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
}

impl Registration {
    /// Checks the format rules, collecting every violation
    pub fn check(&self) -> CoreResult<()> {
        let mut violations: Vec<FieldViolation> = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        FieldViolation::new(
                            field.to_string(),
                            error
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| "Validation failed".to_string()),
                        )
                    })
                })
                .collect(),
        };

        if self.username.chars().any(char::is_whitespace) {
            violations.push(FieldViolation::new(
                "username",
                "Username must not contain spaces",
            ));
        }

        if violations.is_empty() {
            return Ok(());
        }

        // field_errors() is a map; keep the reported order stable
        violations.sort_by(|a, b| b.field.cmp(&a.field));
        Err(CoreError::Validation(violations))
    }
}

/// Public profile data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,

    /// Uploaded avatar or the placeholder
    pub avatar_url: String,

    pub registered_at: DateTime<Utc>,
}

/// Credential store operations
#[derive(Clone)]
pub struct Accounts {
    store: DynStore,
}

impl Accounts {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Validates, hashes and inserts a new user
    ///
    /// # Errors
    ///
    /// - `Validation` for format violations
    /// - `Conflict` if the email is already registered
    /// - `Store` for any other persistence failure
    pub async fn register(&self, registration: Registration) -> CoreResult<UserId> {
        registration.check()?;

        let Registration {
            username,
            email,
            password,
        } = registration;

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| CoreError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| CoreError::Internal(e.to_string()))?;

        let user = self
            .store
            .insert_user(CreateUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => {
                    CoreError::Conflict("A user with this email is already registered".to_string())
                }
                other => CoreError::Store(other),
            })?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user.id)
    }

    /// Resolves an email and password to a user id
    ///
    /// Unknown email and wrong password both return `InvalidCredentials`.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> CoreResult<UserId> {
        let user = self.store.find_user_by_email(email).await?;
        let password = password.to_string();

        let Some(user) = user else {
            tokio::task::spawn_blocking(move || verify_dummy(&password))
                .await
                .map_err(|e| CoreError::Internal(format!("Hashing task failed: {}", e)))?;
            warn!("Login rejected: unknown email");
            return Err(CoreError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| CoreError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| CoreError::Internal(e.to_string()))?;

        if !valid {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        Ok(user.id)
    }

    /// Profile data for a user
    pub async fn get_profile(&self, user_id: UserId) -> CoreResult<Profile> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(CoreError::NotFound("User"))?;

        Ok(Profile {
            id: user.id,
            avatar_url: user.avatar_or_default().to_string(),
            username: user.username,
            registered_at: user.registration_date,
        })
    }

    /// Replaces the avatar reference
    pub async fn update_avatar(&self, user_id: UserId, avatar_url: String) -> CoreResult<()> {
        if !self.store.update_avatar(user_id, Some(avatar_url)).await? {
            return Err(CoreError::NotFound("User"));
        }

        info!(user_id = %user_id, "Avatar updated");
        Ok(())
    }
}
