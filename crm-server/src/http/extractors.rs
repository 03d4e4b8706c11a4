//! Custom Axum extractors

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;

const INVALID_ID: &str = "Invalid ID format";

/// Extract and validate a UUID from a single-segment path
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest(INVALID_ID.into()))?;

        parse_id(&id).map(Self)
    }
}

/// Parse a path id, rejecting with 400 `Invalid ID format`.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(INVALID_ID.into()))
}

/// JSON body whose decode failures are 400 `{"error": ...}`
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string whose decode failures are 400 `{"error": ...}`
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_rejected() {
        assert!(matches!(
            parse_id("not-a-uuid"),
            Err(ApiError::BadRequest(msg)) if msg == "Invalid ID format"
        ));
        assert!(parse_id("6f1c2a44-1d4e-4f1e-9b1a-3c2d1e0f9a8b").is_ok());
    }

    #[tokio::test]
    async fn bad_query_is_400_json() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/accounts?limit=abc")
            .body(())
            .unwrap()
            .into_parts();

        let result =
            ValidQuery::<crate::models::PaginationParams>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(
            result,
            Err(ApiError::BadRequest(msg)) if msg.contains("limit")
        ));
    }
}
