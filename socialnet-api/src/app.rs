/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use socialnet_api::{app::{build_router, AppState}, config::Config};
/// use socialnet_shared::db::pool::{create_pool, DatabaseConfig};
/// use socialnet_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::from_url(config.database.url.clone())).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, uploads::UPLOADS_ROUTE};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chrono::Duration;
use socialnet_shared::{
    accounts::Accounts,
    auth::{
        middleware::{create_session_middleware, SessionGuard},
        token::TokenIssuer,
    },
    feed::FeedAggregator,
    graph::SocialGraph,
    store::DynStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every field
/// is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub accounts: Accounts,
    pub graph: SocialGraph,
    pub feed: FeedAggregator,

    /// Signs and validates session tokens; built once from the configured secret
    pub issuer: Arc<TokenIssuer>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services over one store
    pub fn new(store: DynStore, config: Config) -> Self {
        let issuer = TokenIssuer::new(
            &config.session.secret,
            Duration::hours(config.session.ttl_hours),
        );

        Self {
            accounts: Accounts::new(store.clone()),
            graph: SocialGraph::new(store.clone()),
            feed: FeedAggregator::new(store.clone()),
            store,
            issuer: Arc::new(issuer),
            config: Arc::new(config),
        }
    }

    /// Guard over this state's issuer and cookie name
    pub fn session_guard(&self) -> SessionGuard {
        SessionGuard::new(self.issuer.clone(), self.config.session.cookie_name.clone())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /                  # Index (public)
/// ├── GET  /health            # Health check (public)
/// ├── GET  /uploads/*         # Stored images (public, read-only)
/// ├── GET|POST /register      # Registration form
/// ├── GET|POST /login         # Login form, sets the session cookie
/// ├── POST /token             # Login for API clients, returns a bearer token
/// ├── GET  /logout            # Clears the session cookie
/// └── (session required)
///     ├── GET  /posts         # Friend feed
///     ├── GET|POST /create-post
///     ├── GET  /profile
///     ├── POST /profile/avatar
///     └── GET|POST /find-friends
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Session guard (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check))
        .route(
            "/register",
            get(routes::auth::register_form).post(routes::auth::register),
        )
        .route("/login", get(routes::auth::login_form).post(routes::auth::login))
        .route("/token", post(routes::auth::token))
        .route("/logout", get(routes::auth::logout));

    let protected_routes = Router::new()
        .route("/posts", get(routes::posts::feed))
        .route(
            "/create-post",
            get(routes::posts::create_post_form).post(routes::posts::create_post),
        )
        .route("/profile", get(routes::profile::profile))
        .route("/profile/avatar", post(routes::profile::update_avatar))
        .route(
            "/find-friends",
            get(routes::friends::search).post(routes::friends::add_friend),
        )
        .layer(DefaultBodyLimit::max(state.config.uploads.max_bytes))
        .layer(axum::middleware::from_fn(create_session_middleware(
            state.session_guard(),
        )));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&state.config.uploads.dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
