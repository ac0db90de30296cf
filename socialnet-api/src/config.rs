/// Configuration management for the API server
///
/// Configuration comes from environment variables; a `.env` file is loaded
/// first if present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_PRODUCTION`: Enables HSTS (default: false)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string. If absent it is built from
///   `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and `DB_SSLMODE`
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Token signing secret, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: Token lifetime (default: 24)
/// - `SESSION_COOKIE_NAME`: Cookie carrying the token (default: session)
/// - `SESSION_COOKIE_SECURE`: Mark the cookie `Secure` (default: false)
/// - `FEED_LIMIT`: Posts per friend feed (default: 10)
/// - `UPLOAD_DIR`: Where uploaded images are written (default: ./uploads)
/// - `UPLOAD_MAX_BYTES`: Largest accepted request body for uploads (default: 5 MiB)
///
/// # Example
///
/// ```no_run
/// use socialnet_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use socialnet_shared::auth::token::DEFAULT_TOKEN_TTL_HOURS;
use socialnet_shared::feed::DEFAULT_FEED_LIMIT;

const MIN_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub feed: FeedConfig,
    pub uploads: UploadConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Production mode turns on HSTS
    pub production: bool,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Signing secret
    ///
    /// Must be at least 32 characters. Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub ttl_hours: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub limit: i64,
}

/// Image upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SESSION_SECRET` is missing or shorter than 32 characters
    /// - Neither `DATABASE_URL` nor `DB_HOST` is set
    /// - A numeric or boolean variable doesn't parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 8080u16)?;
        let production = parse_bool_or(&lookup, "API_PRODUCTION", false)?;
        let cors_origins = lookup("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let secret = lookup("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        if secret.chars().count() < MIN_SECRET_LENGTH {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }
        let ttl_hours = parse_or(&lookup, "SESSION_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        let feed_limit = parse_or(&lookup, "FEED_LIMIT", DEFAULT_FEED_LIMIT)?;
        if feed_limit <= 0 {
            anyhow::bail!("FEED_LIMIT must be positive");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                cors_origins,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            session: SessionConfig {
                secret,
                ttl_hours,
                cookie_name: lookup("SESSION_COOKIE_NAME").unwrap_or_else(|| "session".to_string()),
                cookie_secure: parse_bool_or(&lookup, "SESSION_COOKIE_SECURE", false)?,
            },
            feed: FeedConfig { limit: feed_limit },
            uploads: UploadConfig {
                dir: lookup("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./uploads")),
                max_bytes: parse_or(&lookup, "UPLOAD_MAX_BYTES", 5 * 1024 * 1024usize)?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Builds a connection URL from the discrete `DB_*` settings
fn database_url_from_parts<F>(lookup: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST")
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL or DB_HOST environment variable is required"))?;
    let port = parse_or(lookup, "DB_PORT", 5432u16)?;
    let user = lookup("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let name = lookup("DB_NAME").unwrap_or_else(|| "socialnet".to_string());
    let sslmode = lookup("DB_SSLMODE").unwrap_or_else(|| "disable".to_string());

    let credentials = match lookup("DB_PASSWORD") {
        Some(password) if !password.is_empty() => format!(
            "{}:{}",
            urlencoding::encode(&user),
            urlencoding::encode(&password)
        ),
        _ => urlencoding::encode(&user).into_owned(),
    };

    Ok(format!(
        "postgres://{}@{}:{}/{}?sslmode={}",
        credentials, host, port, name, sslmode
    ))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => anyhow::bail!("{} must be a boolean, got {}", key, v),
    }
}
