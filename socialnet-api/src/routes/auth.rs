/// Authentication endpoints
///
/// # Endpoints
///
/// - `GET /register` - Empty registration form
/// - `POST /register` - Register, then `303 -> /login`
/// - `GET /login` - Empty login form
/// - `POST /login` - Check credentials, set the session cookie, `303 -> /posts`
/// - `POST /token` - Check credentials, return a bearer token (JSON)
/// - `GET /logout` - Clear the session cookie, `303 -> /`
///
/// Form endpoints answer a rejected submission with the form view and the
/// matching status (422 validation, 409 conflict, 401 bad credentials) so the
/// renderer can show the message next to the user's input.
///
/// Logging out only clears the cookie. The token inside stays valid until it
/// expires; nothing on the server tracks issued tokens.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    views::{LoginView, RegisterView},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialnet_shared::{accounts::Registration, CoreError, ErrorKind};
use tracing::info;

/// Register form body
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form body, also the `/token` JSON body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Bearer token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,

    /// Always "Bearer"
    pub token_type: String,

    pub expires_at: DateTime<Utc>,
}

pub async fn register_form() -> Json<RegisterView> {
    Json(RegisterView::default())
}

/// Register a new user
///
/// # Errors
///
/// - `422`: username or password format, re-rendered form
/// - `409`: email already registered, re-rendered form
/// - `500`: store failure
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    let RegisterForm {
        username,
        email,
        password,
    } = form;

    let registration = Registration {
        username: username.clone(),
        email: email.clone(),
        password,
    };

    match state.accounts.register(registration).await {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        Err(err) => {
            let status = match err.kind() {
                ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                _ => return Err(err.into()),
            };
            let view = RegisterView::with_error(username, email, &err);
            Ok((status, Json(view)).into_response())
        }
    }
}

pub async fn login_form() -> Json<LoginView> {
    Json(LoginView::default())
}

/// Log in and set the session cookie
///
/// # Errors
///
/// - `401`: unknown email or wrong password (same message for both), re-rendered form
/// - `500`: store failure
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let user_id = match state
        .accounts
        .verify_credentials(&form.email, &form.password)
        .await
    {
        Ok(user_id) => user_id,
        Err(err @ CoreError::InvalidCredentials) => {
            let view = LoginView {
                email: form.email,
                error: Some(err.to_string()),
            };
            return Ok((StatusCode::UNAUTHORIZED, Json(view)).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let issued = state
        .issuer
        .issue(user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    info!(user_id = %user_id, "User logged in");

    let cookie = Cookie::build((state.config.session.cookie_name.clone(), issued.token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session.cookie_secure)
        .path("/");

    Ok((jar.add(cookie), Redirect::to("/posts")).into_response())
}

/// Issue a bearer token for API clients
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/json
///
/// { "email": "a@x.com", "password": "pass1" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "eyJ...", "token_type": "Bearer", "expires_at": "2025-01-02T00:00:00Z" }
/// ```
pub async fn token(
    State(state): State<AppState>,
    Json(req): Json<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user_id = state
        .accounts
        .verify_credentials(&req.email, &req.password)
        .await?;

    let issued = state
        .issuer
        .issue(user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    info!(user_id = %user_id, "Bearer token issued");

    Ok(Json(TokenResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_at: issued.expires_at,
    }))
}

/// Clear the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let cookie = Cookie::build((state.config.session.cookie_name.clone(), String::new())).path("/");

    (jar.remove(cookie), Redirect::to("/"))
}
