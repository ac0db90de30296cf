/// Domain error taxonomy
///
/// Every core operation returns [`CoreResult`]. Errors fall into five kinds:
///
/// - **Validation**: bad input shape, user-correctable
/// - **Conflict**: a uniqueness rule was violated
/// - **Auth**: bad credentials or a missing/invalid/expired token
/// - **NotFound**: a referenced entity is absent
/// - **Store**: persistence or infrastructure failure, never shown to clients
///
/// Store failures are classified from the driver's error codes into
/// [`StoreError`] so the services can turn constraint violations into
/// conflicts without inspecting message text.
use serde::{Deserialize, Serialize};

use crate::auth::token::TokenError;

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// A single failed input rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Input field that failed
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error category, used by the HTTP layer to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    NotFound,
    Store,
}

/// Error type for all core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// One or more input rules failed
    #[error("{}", .0.first().map(|v| v.message.as_str()).unwrap_or("Validation failed"))]
    Validation(Vec<FieldViolation>),

    /// Uniqueness violation (duplicate email, existing friendship)
    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password, deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Session token rejected
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Infrastructure failure outside the store (hashing, token signing)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation error on one field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation(vec![FieldViolation::new(field, message)])
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::InvalidCredentials | CoreError::Token(_) => ErrorKind::Auth,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Store(_) | CoreError::Internal(_) => ErrorKind::Store,
        }
    }
}

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint or unique index rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign key pointed at a missing row
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// A check constraint rejected the row
    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();

            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
            if db_err.is_check_violation() {
                return StoreError::CheckViolation(constraint);
            }
        }

        StoreError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_uses_first_message() {
        let err = CoreError::Validation(vec![
            FieldViolation::new("username", "Username must be between 4 and 20 characters"),
            FieldViolation::new("password", "Password must be at least 5 characters"),
        ]);

        assert_eq!(
            err.to_string(),
            "Username must be between 4 and 20 characters"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CoreError::Conflict("x".into()).kind(), ErrorKind::Conflict);
        assert_eq!(CoreError::InvalidCredentials.kind(), ErrorKind::Auth);
        assert_eq!(CoreError::Token(TokenError::Expired).kind(), ErrorKind::Auth);
        assert_eq!(CoreError::NotFound("User").kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::Internal("boom".into()).kind(), ErrorKind::Store);
        assert_eq!(
            CoreError::Store(StoreError::UniqueViolation("users_email_key".into())).kind(),
            ErrorKind::Store
        );
    }

    #[test]
    fn test_non_database_sqlx_error_maps_to_database() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_credentials_message_is_generic() {
        assert_eq!(
            CoreError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
