//! User endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db::repos::{NewUser, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery, ValidUuid};
use crate::http::server::AppState;
use crate::models::{required, Email, Paginated, Pagination, PaginationParams, ValidationError};

/// Create user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = ValidationError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        required("username", &req.username)?;
        let email = Email::new(&req.email)?;
        required("password", &req.password)?;
        required("role", &req.role)?;

        Ok(Self {
            username: req.username.trim().to_owned(),
            email,
            password: req.password,
            role: req.role.trim().to_owned(),
        })
    }
}

/// GET /users
async fn list_users(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let page = UserRepo::new(&state.pool).list(Pagination::from(params)).await?;
    Ok(Json(page))
}

/// POST /users
async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let new = NewUser::try_from(req)?;
    let user = UserRepo::new(&state.pool).create(new).await?;

    tracing::info!(user_id = %user.id, created_by = %caller.user_id, "user created via API");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<User>, ApiError> {
    UserRepo::new(&state.pool)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user"))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "hunter2".into(),
            role: "user".into(),
        }
    }

    #[test]
    fn valid_request_converts() {
        let new = NewUser::try_from(request()).unwrap();
        assert_eq!(new.email.as_str(), "ada@example.com");
        assert_eq!(new.role, "user");
    }

    #[test]
    fn each_required_field_is_named() {
        let err = NewUser::try_from(CreateUserRequest {
            username: " ".into(),
            ..request()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "username is required");

        let err = NewUser::try_from(CreateUserRequest {
            role: String::new(),
            ..request()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "role is required");
    }

    #[test]
    fn bad_email_is_rejected() {
        let err = NewUser::try_from(CreateUserRequest {
            email: "nope".into(),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { field: "email", .. }));
    }
}
