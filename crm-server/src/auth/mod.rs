//! Authentication: password hashing, bearer tokens and route guards
//!
//! - [`password`]: bcrypt on the blocking pool
//! - [`jwt`]: HS256 claims with a 24 hour lifetime
//! - [`middleware`]: `require_auth`, `require_role` and the [`AuthUser`] extractor

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtKeys};
pub use middleware::{require_auth, require_role, AuthUser};

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingToken,

    #[error("Authorization header must use the Bearer scheme")]
    InvalidScheme,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("Could not generate token: {0}")]
    Signing(String),
}
