//! Route guards
//!
//! `require_auth` verifies the bearer token and stores [`Claims`] in the
//! request extensions; `require_role` runs after it and checks the role claim.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::{AuthError, Claims, JwtKeys};
use crate::http::ApiError;

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(req: &Request) -> Result<&str, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidScheme),
    }
}

/// Reject the request with 401 unless it carries a valid token.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = keys.verify(bearer_token(&req)?)?;
    tracing::debug!(user_id = %claims.user_id, role = %claims.role, "authenticated request");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Reject with 403 unless the caller's role claim equals `role`.
pub async fn require_role(
    State(role): State<&'static str>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AuthError::MissingToken)?;

    if claims.role != role {
        tracing::warn!(user_id = %claims.user_id, required = role, "role check failed");
        return Err(AuthError::Forbidden.into());
    }
    Ok(next.run(req).await)
}

/// Verified claims of the caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &[u8] = b"middleware-test-secret";

    fn token(role: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        JwtKeys::from_secret(SECRET)
            .issue(&Claims {
                user_id: Uuid::new_v4(),
                username: "grace".into(),
                email: "grace@example.com".into(),
                role: role.into(),
                iat: now,
                exp: now + 60,
            })
            .unwrap()
    }

    async fn whoami(AuthUser(claims): AuthUser) -> String {
        claims.username
    }

    fn app() -> Router {
        let keys = JwtKeys::from_secret(SECRET);
        let admin = Router::new()
            .route("/admin", get(whoami))
            .route_layer(middleware::from_fn_with_state("admin", require_role));

        Router::new()
            .route("/me", get(whoami))
            .merge(admin)
            .route_layer(middleware::from_fn_with_state(keys, require_auth))
    }

    fn request(path: &str, auth: Option<String>) -> Request {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        let response = app().oneshot(request("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_401() {
        let response = app()
            .oneshot(request("/me", Some("Basic dXNlcjpwYXNz".into())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let response = app()
            .oneshot(request("/me", Some(format!("Bearer {}", token("user")))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn role_gate() {
        let denied = app()
            .oneshot(request("/admin", Some(format!("Bearer {}", token("user")))))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let allowed = app()
            .oneshot(request("/admin", Some(format!("Bearer {}", token("admin")))))
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }
}
