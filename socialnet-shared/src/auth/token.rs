/// Session token issuing and validation
///
/// A session token is an HS256-signed JWT whose claims carry exactly the user
/// id and a validity window. Validation is a pure function of the token and the
/// process-wide secret held by [`TokenIssuer`]; no store lookup is made, so
/// tokens survive restarts as long as the secret is stable.
///
/// # Claims
///
/// - `sub`: User ID
/// - `iss`: Issuer (always "socialnet")
/// - `iat`: Issued at timestamp
/// - `nbf`: Not before timestamp
/// - `exp`: Expiration timestamp
///
/// # Revocation
///
/// There is none. A token stays valid until `exp` even after the holder logs
/// out; keep the TTL short if that matters.
///
/// # Example
///
/// ```
/// use socialnet_shared::auth::token::TokenIssuer;
/// use socialnet_shared::UserId;
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("test-secret-key-at-least-32-bytes-long", Duration::hours(24));
///
/// let issued = issuer.issue(UserId(7))?;
/// assert_eq!(issuer.validate(&issued.token)?, UserId(7));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::UserId;

/// Issuer claim stamped on every token
pub const TOKEN_ISSUER: &str = "socialnet";

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Malformed token, bad signature, wrong issuer or not yet valid
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token is past its expiry
    #[error("Token has expired")]
    Expired,
}

/// Typed session payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: UserId,

    /// Issuer - Always "socialnet"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims valid from now for `expires_in`
    pub fn new(user_id: UserId, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly issued token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// Encoded JWT
    pub token: String,

    /// When the token stops validating
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates session tokens
///
/// Constructed once at startup from the configured secret and shared
/// read-only (behind an `Arc`) with the request guard and the login handlers.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer signing with `secret`
    ///
    /// The secret should be at least 32 bytes; configuration loading enforces it.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issues a token for `user_id` valid for the configured TTL
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, TokenError> {
        self.issue_claims(&Claims::new(user_id, self.ttl))
    }

    /// Signs arbitrary claims
    pub fn issue_claims(&self, claims: &Claims) -> Result<IssuedToken, TokenError> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Create(format!("Token encoding failed: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Verifies signature, issuer and validity window, returning the claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Validates a token and returns the user it was issued for
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.decode(token).map(|claims| claims.sub)
    }
}
