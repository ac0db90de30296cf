/// Index and health check endpoints
///
/// # Endpoints
///
/// - `GET /` - Service name and entry points
/// - `GET /health` - Liveness plus store connectivity
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

/// Index page data
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub name: String,
    pub version: String,
    pub register: String,
    pub login: String,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "socialnet".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        register: "/register".to_string(),
        login: "/login".to_string(),
    })
}

/// Health check handler
///
/// Always answers 200; a failed store ping only degrades the status.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!("Health check store ping failed: {}", e);
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    })
}
