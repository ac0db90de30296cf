/// Session guard middleware for Axum
///
/// The guard is the only place a user id enters request handling. It looks for
/// a session token in two places, in order:
///
/// 1. `Authorization: Bearer <token>` (API clients)
/// 2. The session cookie (browsers)
///
/// On success it inserts an [`AuthContext`] into the request extensions; on
/// failure the request never reaches the handler.
///
/// # Rejections
///
/// - Requests that sent an `Authorization` header get `401` with a JSON body.
/// - Anything else is treated as a browser and redirected to `/login` with `303`.
///
/// A malformed `Authorization` header is a rejection; the guard does not fall
/// back to the cookie in that case.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use chrono::Duration;
/// use socialnet_shared::auth::middleware::{create_session_middleware, AuthContext, SessionGuard};
/// use socialnet_shared::auth::token::TokenIssuer;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let issuer = Arc::new(TokenIssuer::new("test-secret-key-at-least-32-bytes-long", Duration::hours(24)));
/// let guard = SessionGuard::new(issuer, "session");
///
/// let app: Router = Router::new()
///     .route("/posts", get(handler))
///     .layer(middleware::from_fn(create_session_middleware(guard)));
/// ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::token::{TokenError, TokenIssuer};
use crate::models::user::UserId;

/// Where browsers are sent when they are not signed in
pub const LOGIN_PATH: &str = "/login";

/// Authenticated identity attached to the request
///
/// Handlers take it directly as an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: UserId,
}

/// Why the guard turned a request away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No token anywhere
    Missing,

    /// Malformed header, bad signature or wrong issuer
    Invalid,

    Expired,
}

impl RejectReason {
    fn message(&self) -> &'static str {
        match self {
            RejectReason::Missing => "Authentication required",
            RejectReason::Invalid => "Invalid session token",
            RejectReason::Expired => "Session expired",
        }
    }
}

/// Guard rejection; renders as a redirect or a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRejection {
    pub reason: RejectReason,

    /// Send the client to the login page instead of answering 401
    pub redirect: bool,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        if self.redirect {
            return Redirect::to(LOGIN_PATH).into_response();
        }

        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": {
                    "code": "UNAUTHORIZED",
                    "message": self.reason.message(),
                }
            })),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthRejection {
                reason: RejectReason::Missing,
                redirect: !parts.headers.contains_key(header::AUTHORIZATION),
            })
    }
}

/// Validates session tokens carried by requests
#[derive(Debug, Clone)]
pub struct SessionGuard {
    issuer: Arc<TokenIssuer>,
    cookie_name: String,
}

impl SessionGuard {
    pub fn new(issuer: Arc<TokenIssuer>, cookie_name: impl Into<String>) -> Self {
        Self {
            issuer,
            cookie_name: cookie_name.into(),
        }
    }

    /// Resolves the request's headers to an identity
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthRejection> {
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            let reject = |reason: RejectReason| AuthRejection {
                reason,
                redirect: false,
            };

            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    debug!("Rejected malformed Authorization header");
                    reject(RejectReason::Invalid)
                })?;

            return self.validate(token).map_err(reject);
        }

        let jar = CookieJar::from_headers(headers);
        let cookie = jar.get(&self.cookie_name).ok_or_else(|| {
            debug!("No session cookie");
            AuthRejection {
                reason: RejectReason::Missing,
                redirect: true,
            }
        })?;

        self.validate(cookie.value()).map_err(|reason| AuthRejection {
            reason,
            redirect: true,
        })
    }

    fn validate(&self, token: &str) -> Result<AuthContext, RejectReason> {
        match self.issuer.validate(token) {
            Ok(user_id) => {
                debug!(user_id = %user_id, "Session accepted");
                Ok(AuthContext { user_id })
            }
            Err(TokenError::Expired) => {
                debug!("Rejected expired session token");
                Err(RejectReason::Expired)
            }
            Err(e) => {
                debug!("Rejected session token: {}", e);
                Err(RejectReason::Invalid)
            }
        }
    }
}

/// Session guard middleware
///
/// Adds [`AuthContext`] to the request extensions or short-circuits with an
/// [`AuthRejection`].
pub async fn session_auth_middleware(
    guard: SessionGuard,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let auth_context = guard.authenticate(req.headers())?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Creates a session guard middleware closure
///
/// ```no_run
/// # use std::sync::Arc;
/// # use axum::{middleware, routing::get, Router};
/// # use socialnet_shared::auth::middleware::{create_session_middleware, SessionGuard};
/// # fn example(guard: SessionGuard) -> Router {
/// Router::new()
///     .route("/profile", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_session_middleware(guard)))
/// # }
/// ```
pub fn create_session_middleware(
    guard: SessionGuard,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthRejection>> + Send>> + Clone {
    move |req, next| {
        let guard = guard.clone();
        Box::pin(session_auth_middleware(guard, req, next))
    }
}
