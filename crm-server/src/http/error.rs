//! API error type with IntoResponse
//!
//! Every error renders as `{"error": "<message>"}` with a matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::db::repos::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Field validation failed (400)
    Validation(ValidationError),

    /// Body or query could not be decoded (400)
    BadRequest(String),

    /// Missing or rejected credentials (401, 403 for role failures)
    Auth(AuthError),

    /// Resource not found (404)
    NotFound { resource: String },

    /// Store failure (500, logged, message passed through)
    Database(DbError),
}

impl ApiError {
    /// 404 for a lookup that came back empty.
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound {
            resource: resource.to_owned(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::Hashing(_) | AuthError::Signing(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// "note association" -> "Note association"
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(e) => e.to_string(),
            Self::BadRequest(message) => message,
            Self::Auth(e) => {
                if status.is_server_error() {
                    tracing::error!(error = %e, "auth failure");
                }
                e.to_string()
            }
            Self::NotFound { resource } => format!("{} not found", capitalize(&resource)),
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                e.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, .. } => Self::not_found(resource),
            DbError::Validation(e) => Self::Validation(e),
            _ => Self::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let (status, body) = body_of(ValidationError::NoAssociations.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "At least one record association is required");
    }

    #[tokio::test]
    async fn missing_row_is_404() {
        let err = DbError::NotFound {
            resource: "account",
            id: "42".into(),
        };
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Account not found");
    }

    #[tokio::test]
    async fn bad_credentials_are_401() {
        let (status, body) = body_of(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn role_failure_is_403() {
        let (status, _) = body_of(AuthError::Forbidden.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn store_failure_passes_message_through() {
        let err = DbError::Internal("connection reset".into());
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "connection reset");
    }

    #[test]
    fn capitalizes_resource() {
        assert_eq!(capitalize("note association"), "Note association");
        assert_eq!(capitalize(""), "");
    }
}
