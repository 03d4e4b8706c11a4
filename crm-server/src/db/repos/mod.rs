//! Repository implementations for database access
//!
//! Every entity shares one generic repository ([`Repo`]) for the
//! list/get/delete scaffolding; entity modules add create/update and
//! relationship queries as inherent impls on `Repo<'_, Entity>`.
//!
//! Patterns:
//! - Lookups return `Option`, deletes return `DbError::NotFound`
//! - Nullable references bind as SQL NULL, never a nil UUID
//! - Multi-statement writes run inside a transaction

pub mod accounts;
pub mod contacts;
pub mod opportunities;
pub mod notes;
pub mod users;

use std::marker::PhantomData;

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::models::{Paginated, Pagination, ValidationError};

pub use accounts::{Account, AccountDetail, AccountRepo, NewAccount, AccountPatch};
pub use contacts::{Contact, ContactRepo, NewContact, ContactPatch};
pub use opportunities::{NewOpportunity, Opportunity, OpportunityPatch, OpportunityRepo};
pub use notes::{Note, NoteAssociation, NoteRepo, NewNote, RecordLink};
pub use users::{NewUser, User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("no {resource} found with ID {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("database did not respond within {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Internal(String),
}

/// Row mapping and SQL templates for one table.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Human-readable resource name used in errors ("account").
    const RESOURCE: &'static str;
    const TABLE: &'static str;
    /// Comma-separated select list matching the `FromRow` fields.
    const COLUMNS: &'static str;
    const ORDER_BY: &'static str;
}

/// Postal fields shared by accounts and contacts
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
pub struct PostalAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Generic repository over one entity table
pub struct Repo<'a, E> {
    pool: &'a PgPool,
    _entity: PhantomData<E>,
}

impl<'a, E: Entity> Repo<'a, E> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// List one page in entity order.
    ///
    /// Uses COUNT(*) OVER() so the total comes back with the rows.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<E>, DbError> {
        let sql = format!(
            "SELECT {}, COUNT(*) OVER() AS total FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
            E::COLUMNS,
            E::TABLE,
            E::ORDER_BY
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total = match rows.first() {
            Some(row) => row.try_get::<i64, _>("total")?,
            // Past the last row the window is empty; count separately.
            None if page.offset > 0 => self.count().await?,
            None => 0,
        };

        let items = rows
            .iter()
            .map(|row| E::from_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(items, total, page))
    }

    /// Count all rows.
    pub async fn count(&self) -> Result<i64, DbError> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(self.pool).await?;
        Ok(count)
    }

    /// Get a single row by id; `None` when absent.
    pub async fn get(&self, id: Uuid) -> Result<Option<E>, DbError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        let item = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(item)
    }

    /// All rows whose `column` equals `id`, in entity order.
    pub(crate) async fn list_by(&self, column: &'static str, id: Uuid) -> Result<Vec<E>, DbError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            column,
            E::ORDER_BY
        );
        let items = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }

    /// Hard delete by id.
    ///
    /// Returns `DbError::NotFound` when no row matched.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: E::RESOURCE,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn pool(&self) -> &'a PgPool {
        self.pool
    }
}
