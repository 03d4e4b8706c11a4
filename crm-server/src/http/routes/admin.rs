//! Admin-only routes
//!
//! Mounted behind `require_role("admin")`; nothing is registered yet.

use std::sync::Arc;

use axum::Router;

use crate::http::server::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
}
