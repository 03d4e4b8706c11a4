//! User repository
//!
//! The password hash is only ever read inside this module; [`User`] has no
//! field for it, so it cannot be serialized by accident.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::password;
use crate::models::Email;

use super::{DbError, Entity, Repo};

macro_rules! user_columns {
    () => {
        "id, username, email, role, created_at, updated_at"
    };
}

/// User record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    const RESOURCE: &'static str = "user";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = user_columns!();
    const ORDER_BY: &'static str = "username";
}

#[derive(FromRow)]
struct UserCredentials {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Fields for a new user; `password` is plaintext until hashed in `create`
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password: String,
    pub role: String,
}

/// User repository
pub type UserRepo<'a> = Repo<'a, User>;

impl<'a> Repo<'a, User> {
    pub async fn create(&self, new: NewUser) -> Result<User, DbError> {
        let password_hash = password::hash(new.password)
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let user = sqlx::query_as::<_, User>(concat!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING ",
            user_columns!()
        ))
        .bind(&new.username)
        .bind(new.email.as_str())
        .bind(&password_hash)
        .bind(&new.role)
        .fetch_one(self.pool())
        .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "created user");
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    /// The user when `password` matches the stored hash, otherwise `None`.
    ///
    /// Unknown emails still pay for one bcrypt comparison.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserCredentials>(concat!(
            "SELECT ",
            user_columns!(),
            ", password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        let matched = match row {
            Some(row) => password::verify(password.to_owned(), row.password_hash)
                .await
                .map(|ok| ok.then_some(row.user)),
            None => password::verify_dummy(password.to_owned())
                .await
                .map(|_| None),
        };

        matched.map_err(|e| DbError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_has_no_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            role: "user".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(user).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert!(!keys.iter().any(|k| k.contains("password")));
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn columns_exclude_hash() {
        assert!(!User::COLUMNS.contains("password_hash"));
    }
}
