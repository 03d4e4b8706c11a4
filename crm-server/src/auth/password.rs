//! bcrypt hashing on the blocking pool

use once_cell::sync::Lazy;

use super::AuthError;

/// Work factor for stored hashes.
pub const COST: u32 = bcrypt::DEFAULT_COST;

/// Compared against when the email is unknown so the miss costs one bcrypt verify.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| bcrypt::hash("not-a-real-password", COST).ok());

/// Hash a password with a fresh salt.
pub async fn hash(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, COST))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a stored hash. A malformed hash never matches.
pub async fn verify(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Burn one verify against the dummy hash; always `false`.
pub async fn verify_dummy(password: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = bcrypt::verify(password, hash);
        }
        false
    })
    .await
    .map_err(|e| AuthError::Hashing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hash("s3cret".into()).await.unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(verify("s3cret".into(), hashed.clone()).await.unwrap());
        assert!(!verify("wrong".into(), hashed).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_does_not_match() {
        assert!(!verify("s3cret".into(), "plaintext".into()).await.unwrap());
    }

    #[tokio::test]
    async fn dummy_never_matches() {
        assert!(!verify_dummy("not-a-real-password".into()).await.unwrap());
    }
}
