//! Contact endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::accounts::AddressFields;
use super::MessageResponse;
use crate::db::repos::{Contact, ContactPatch, ContactRepo, NewContact};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    non_empty, required, required_id, Email, Paginated, Pagination, PaginationParams,
    ValidationError,
};

/// Optional contact email: empty is absent, anything else must be well formed.
fn optional_email(value: Option<String>) -> Result<Option<String>, ValidationError> {
    match non_empty(value) {
        Some(raw) => Ok(Some(Email::new(&raw)?.as_str().to_owned())),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub account_id: Option<Uuid>,
    #[serde(flatten)]
    pub address: AddressFields,
    #[serde(default)]
    pub created_by: Uuid,
}

impl TryFrom<CreateContactRequest> for NewContact {
    type Error = ValidationError;

    fn try_from(req: CreateContactRequest) -> Result<Self, Self::Error> {
        required("first_name", &req.first_name)?;
        required("last_name", &req.last_name)?;
        Ok(Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: optional_email(req.email)?,
            phone: non_empty(req.phone),
            title: non_empty(req.title),
            account_id: req.account_id.filter(|id| !id.is_nil()),
            address: req.address.into(),
            created_by: required_id("created_by", req.created_by)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub account_id: Option<Uuid>,
    #[serde(flatten)]
    pub address: AddressFields,
    #[serde(default)]
    pub updated_by: Uuid,
}

impl UpdateContactRequest {
    fn into_patch(self) -> Result<(Uuid, ContactPatch), ValidationError> {
        let updated_by = required_id("updated_by", self.updated_by)?;
        let patch = ContactPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            email: optional_email(self.email)?,
            phone: self.phone,
            title: self.title,
            account_id: self.account_id.filter(|id| !id.is_nil()),
            address: self.address.into(),
        };
        Ok((updated_by, patch))
    }
}

/// GET /contacts
async fn list_contacts(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Paginated<Contact>>, ApiError> {
    let page = ContactRepo::new(&state.pool).list(Pagination::from(params)).await?;
    Ok(Json(page))
}

/// POST /contacts
async fn create_contact(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let new = NewContact::try_from(req)?;
    let contact = ContactRepo::new(&state.pool).create(new).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /contacts/{id}
async fn get_contact(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Contact>, ApiError> {
    ContactRepo::new(&state.pool)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("contact"))
}

/// PUT /contacts/{id}
async fn update_contact(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ValidJson(req): ValidJson<UpdateContactRequest>,
) -> Result<Json<Contact>, ApiError> {
    let (updated_by, patch) = req.into_patch()?;
    let contact = ContactRepo::new(&state.pool)
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("contact"))?;

    tracing::info!(contact_id = %id, %updated_by, "contact updated");
    Ok(Json(contact))
}

/// DELETE /contacts/{id}
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<MessageResponse>, ApiError> {
    ContactRepo::new(&state.pool).delete(id).await?;
    Ok(Json(MessageResponse::new("Contact deleted successfully")))
}

/// GET /contacts/account/{id} - bare array
async fn contacts_for_account(
    State(state): State<Arc<AppState>>,
    ValidUuid(account_id): ValidUuid,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = ContactRepo::new(&state.pool)
        .list_for_account(account_id)
        .await?;
    Ok(Json(contacts))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/contacts/account/{id}", get(contacts_for_account))
}
