//! Note repository
//!
//! A note is attached to accounts, contacts and opportunities through
//! `note_associations`. Creation and deletion touch both tables and run in a
//! single transaction; associations for a page of notes are fetched with one
//! `ANY($1)` query.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::pool::with_transaction;
use crate::models::{Paginated, Pagination, RecordType, ValidationError};

use super::{DbError, Entity, Repo};

macro_rules! note_columns {
    () => {
        "id, content, created_by, created_at, updated_at"
    };
}

/// Note record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Records this note is attached to; loaded separately
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RecordLink>,
}

impl Entity for Note {
    const RESOURCE: &'static str = "note";
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static str = note_columns!();
    const ORDER_BY: &'static str = "created_at DESC";
}

/// One typed record a note points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct RecordLink {
    pub record_id: Uuid,
    #[sqlx(try_from = "String")]
    pub record_type: RecordType,
}

/// Association row: `(note_id, record_id, record_type)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct NoteAssociation {
    pub note_id: Uuid,
    pub record_id: Uuid,
    #[sqlx(try_from = "String")]
    pub record_type: RecordType,
}

impl NoteAssociation {
    pub fn link(&self) -> RecordLink {
        RecordLink {
            record_id: self.record_id,
            record_type: self.record_type,
        }
    }
}

/// Fields for a new note
#[derive(Debug, Clone)]
pub struct NewNote {
    content: String,
    created_by: Uuid,
    records: Vec<RecordLink>,
}

impl NewNote {
    /// A note must point at one record at least.
    pub fn new(
        content: String,
        created_by: Uuid,
        records: Vec<RecordLink>,
    ) -> Result<Self, ValidationError> {
        if records.is_empty() {
            return Err(ValidationError::NoAssociations);
        }
        Ok(Self {
            content,
            created_by,
            records,
        })
    }
}

/// Note repository
pub type NoteRepo<'a> = Repo<'a, Note>;

impl<'a> Repo<'a, Note> {
    /// Insert the note and every association, or nothing.
    pub async fn create(&self, new: NewNote) -> Result<Note, DbError> {
        with_transaction(self.pool(), move |conn| {
            Box::pin(async move {
                let mut note = sqlx::query_as::<_, Note>(concat!(
                    "INSERT INTO notes (content, created_by) VALUES ($1, $2) RETURNING ",
                    note_columns!()
                ))
                .bind(&new.content)
                .bind(new.created_by)
                .fetch_one(&mut *conn)
                .await?;

                for link in &new.records {
                    sqlx::query(
                        "INSERT INTO note_associations (note_id, record_id, record_type) \
                         VALUES ($1, $2, $3)",
                    )
                    .bind(note.id)
                    .bind(link.record_id)
                    .bind(link.record_type.as_str())
                    .execute(&mut *conn)
                    .await?;
                }

                note.records = new.records;
                Ok::<_, DbError>(note)
            })
        })
        .await
    }

    /// Replace the content unless it is empty; associations are untouched.
    pub async fn update(&self, id: Uuid, content: Option<String>) -> Result<Option<Note>, DbError> {
        let note = sqlx::query_as::<_, Note>(concat!(
            "UPDATE notes SET \
             content = COALESCE(NULLIF($1, ''), content), \
             updated_at = NOW() \
             WHERE id = $2 \
             RETURNING ",
            note_columns!()
        ))
        .bind(content)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        match note {
            Some(note) => Ok(self.with_records(vec![note]).await?.pop()),
            None => Ok(None),
        }
    }

    /// One page of notes, newest first, each with its records.
    pub async fn list_with_records(&self, page: Pagination) -> Result<Paginated<Note>, DbError> {
        let mut page = self.list(page).await?;
        page.data = self.with_records(page.data).await?;
        Ok(page)
    }

    pub async fn get_with_records(&self, id: Uuid) -> Result<Option<Note>, DbError> {
        match self.get(id).await? {
            Some(note) => Ok(self.with_records(vec![note]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Notes attached to one record, newest first.
    pub async fn list_for_record(
        &self,
        record_id: Uuid,
        record_type: RecordType,
    ) -> Result<Vec<Note>, DbError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT n.id, n.content, n.created_by, n.created_at, n.updated_at \
             FROM notes n \
             JOIN note_associations na ON na.note_id = n.id \
             WHERE na.record_id = $1 AND na.record_type = $2 \
             ORDER BY n.created_at DESC",
        )
        .bind(record_id)
        .bind(record_type.as_str())
        .fetch_all(self.pool())
        .await?;

        self.with_records(notes).await
    }

    /// Remove associations, then the note, in one transaction.
    pub async fn delete_cascade(&self, id: Uuid) -> Result<(), DbError> {
        with_transaction(self.pool(), move |conn| {
            Box::pin(async move {
                sqlx::query("DELETE FROM note_associations WHERE note_id = $1")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                let result = sqlx::query("DELETE FROM notes WHERE id = $1")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::NotFound {
                        resource: Note::RESOURCE,
                        id: id.to_string(),
                    });
                }
                Ok::<_, DbError>(())
            })
        })
        .await
    }

    /// Attach a note to one more record.
    ///
    /// A missing note surfaces as `DbError::NotFound`.
    pub async fn add_association(&self, association: NoteAssociation) -> Result<(), DbError> {
        let result = sqlx::query(
            "INSERT INTO note_associations (note_id, record_id, record_type) \
             VALUES ($1, $2, $3)",
        )
        .bind(association.note_id)
        .bind(association.record_id)
        .bind(association.record_type.as_str())
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(DbError::NotFound {
                    resource: Note::RESOURCE,
                    id: association.note_id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Detach a note from a record; `DbError::NotFound` when no link matched.
    pub async fn remove_association(&self, association: NoteAssociation) -> Result<(), DbError> {
        let result = sqlx::query(
            "DELETE FROM note_associations \
             WHERE note_id = $1 AND record_id = $2 AND record_type = $3",
        )
        .bind(association.note_id)
        .bind(association.record_id)
        .bind(association.record_type.as_str())
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "note association",
                id: format!("{}/{}", association.note_id, association.record_id),
            });
        }
        Ok(())
    }

    /// Fill `records` for every note with a single query.
    async fn with_records(&self, mut notes: Vec<Note>) -> Result<Vec<Note>, DbError> {
        if notes.is_empty() {
            return Ok(notes);
        }

        let ids: Vec<Uuid> = notes.iter().map(|n| n.id).collect();
        let rows = sqlx::query_as::<_, NoteAssociation>(
            "SELECT note_id, record_id, record_type FROM note_associations \
             WHERE note_id = ANY($1) \
             ORDER BY created_at",
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        let mut by_note: HashMap<Uuid, Vec<RecordLink>> = HashMap::new();
        for row in rows {
            by_note.entry(row.note_id).or_default().push(row.link());
        }
        for note in &mut notes {
            note.records = by_note.remove(&note.id).unwrap_or_default();
        }
        Ok(notes)
    }
}
