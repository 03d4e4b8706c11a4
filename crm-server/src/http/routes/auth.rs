//! Login endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Claims};
use crate::db::repos::{User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::{required, Email};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = Email::new(&req.email)?;
    required("password", &req.password)?;

    let user = UserRepo::new(&state.pool)
        .verify_credentials(email.as_str(), &req.password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let token = state.jwt.issue(&Claims::for_user(&user))?;
    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(LoginResponse { token, user }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/auth/login", post(login))
}
