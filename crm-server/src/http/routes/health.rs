//! Health check endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::db::health_check;
use crate::http::server::AppState;

/// Health check response; always 200 with the store status inside
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatabaseHealth {
    fn from_probe<T, E: std::fmt::Display>(probe: Result<T, E>) -> Self {
        match probe {
            Ok(_) => Self {
                status: "ok",
                error: None,
            },
            Err(e) => Self {
                status: "error",
                error: Some(e.to_string()),
            },
        }
    }
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let probe = health_check(&state.pool).await;
    if let Err(e) = &probe {
        tracing::warn!(error = %e, "health endpoint: database unavailable");
    }

    Json(HealthResponse {
        status: "ok",
        database: DatabaseHealth::from_probe(probe),
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
