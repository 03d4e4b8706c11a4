//! Note endpoints
//!
//! Notes link to accounts, contacts and opportunities. `record_type` is
//! validated here, before anything reaches the repository.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::MessageResponse;
use crate::db::repos::{NewNote, Note, NoteAssociation, NoteRepo, RecordLink};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    required, required_id, Paginated, Pagination, PaginationParams, RecordType, ValidationError,
};

/// Record reference as sent by clients; the type is checked on conversion
#[derive(Debug, Deserialize)]
pub struct RecordRef {
    #[serde(default)]
    pub record_id: Uuid,
    #[serde(default)]
    pub record_type: String,
}

impl TryFrom<RecordRef> for RecordLink {
    type Error = ValidationError;

    fn try_from(r: RecordRef) -> Result<Self, Self::Error> {
        Ok(Self {
            record_id: required_id("record_id", r.record_id)?,
            record_type: r.record_type.parse()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_by: Uuid,
    #[serde(default)]
    pub records: Vec<RecordRef>,
}

impl TryFrom<CreateNoteRequest> for NewNote {
    type Error = ValidationError;

    fn try_from(req: CreateNoteRequest) -> Result<Self, Self::Error> {
        required("content", &req.content)?;
        let created_by = required_id("created_by", req.created_by)?;
        let records = req
            .records
            .into_iter()
            .map(RecordLink::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        NewNote::new(req.content, created_by, records)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub content: Option<String>,
    #[serde(default)]
    pub updated_by: Uuid,
}

/// Body for POST and DELETE /notes/associations
#[derive(Debug, Deserialize)]
pub struct AssociationRequest {
    #[serde(default)]
    pub note_id: Uuid,
    #[serde(flatten)]
    pub record: RecordRef,
    pub created_by: Option<Uuid>,
}

impl TryFrom<AssociationRequest> for NoteAssociation {
    type Error = ValidationError;

    fn try_from(req: AssociationRequest) -> Result<Self, Self::Error> {
        let note_id = required_id("note_id", req.note_id)?;
        let link = RecordLink::try_from(req.record)?;
        Ok(Self {
            note_id,
            record_id: link.record_id,
            record_type: link.record_type,
        })
    }
}

/// GET /notes
async fn list_notes(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Paginated<Note>>, ApiError> {
    let page = NoteRepo::new(&state.pool)
        .list_with_records(Pagination::from(params))
        .await?;
    Ok(Json(page))
}

/// POST /notes
async fn create_note(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let new = NewNote::try_from(req)?;
    let note = NoteRepo::new(&state.pool).create(new).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /notes/{id}
async fn get_note(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Note>, ApiError> {
    NoteRepo::new(&state.pool)
        .get_with_records(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("note"))
}

/// PUT /notes/{id}
async fn update_note(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ValidJson(req): ValidJson<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let updated_by = required_id("updated_by", req.updated_by)?;
    let note = NoteRepo::new(&state.pool)
        .update(id, req.content)
        .await?
        .ok_or_else(|| ApiError::not_found("note"))?;

    tracing::info!(note_id = %id, %updated_by, "note updated");
    Ok(Json(note))
}

/// DELETE /notes/{id} - associations go with it
async fn delete_note(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<MessageResponse>, ApiError> {
    NoteRepo::new(&state.pool).delete_cascade(id).await?;
    Ok(Json(MessageResponse::new("Note deleted successfully")))
}

const INVALID_RECORD_ID: &str = "Invalid record ID format";

/// GET /notes/record/{type}/{id} - bare array
async fn notes_for_record(
    State(state): State<Arc<AppState>>,
    Path((record_type, record_id)): Path<(String, String)>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let record_type: RecordType = record_type.parse()?;
    let record_id = Uuid::parse_str(&record_id)
        .map_err(|_| ApiError::BadRequest(INVALID_RECORD_ID.into()))?;

    let notes = NoteRepo::new(&state.pool)
        .list_for_record(record_id, record_type)
        .await?;
    Ok(Json(notes))
}

/// POST /notes/associations
async fn add_association(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<AssociationRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let created_by = req.created_by;
    let association = NoteAssociation::try_from(req)?;
    NoteRepo::new(&state.pool).add_association(association).await?;

    tracing::info!(
        note_id = %association.note_id,
        record_id = %association.record_id,
        record_type = %association.record_type,
        ?created_by,
        "note association added"
    );
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Note association added successfully")),
    ))
}

/// DELETE /notes/associations
async fn remove_association(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<AssociationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let association = NoteAssociation::try_from(req)?;
    NoteRepo::new(&state.pool)
        .remove_association(association)
        .await?;
    Ok(Json(MessageResponse::new(
        "Note association removed successfully",
    )))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/associations",
            post(add_association).delete(remove_association),
        )
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/notes/record/{record_type}/{id}", get(notes_for_record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_records_rejected_before_store() {
        let req: CreateNoteRequest = serde_json::from_value(json!({
            "content": "hi",
            "created_by": Uuid::new_v4(),
            "records": [],
        }))
        .unwrap();
        assert_eq!(
            NewNote::try_from(req).unwrap_err(),
            ValidationError::NoAssociations
        );
    }

    #[test]
    fn unknown_record_type_rejected() {
        let req: CreateNoteRequest = serde_json::from_value(json!({
            "content": "hi",
            "created_by": Uuid::new_v4(),
            "records": [{"record_id": Uuid::new_v4(), "record_type": "lead"}],
        }))
        .unwrap();
        assert_eq!(
            NewNote::try_from(req).unwrap_err(),
            ValidationError::InvalidRecordType
        );
    }

    #[test]
    fn association_body_is_flat() {
        let note_id = Uuid::new_v4();
        let record_id = Uuid::new_v4();
        let req: AssociationRequest = serde_json::from_value(json!({
            "note_id": note_id,
            "record_id": record_id,
            "record_type": "contact",
            "created_by": Uuid::new_v4(),
        }))
        .unwrap();

        let association = NoteAssociation::try_from(req).unwrap();
        assert_eq!(association.note_id, note_id);
        assert_eq!(association.record_id, record_id);
        assert_eq!(association.record_type, RecordType::Contact);
    }

    #[test]
    fn association_requires_note() {
        let req: AssociationRequest = serde_json::from_value(json!({
            "record_id": Uuid::new_v4(),
            "record_type": "account",
        }))
        .unwrap();
        assert_eq!(
            NoteAssociation::try_from(req).unwrap_err(),
            ValidationError::Empty { field: "note_id" }
        );
    }
}
