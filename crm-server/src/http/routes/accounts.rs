//! Account endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::MessageResponse;
use crate::db::repos::{Account, AccountDetail, AccountPatch, AccountRepo, NewAccount, PostalAddress};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    non_empty, required, required_id, Paginated, Pagination, PaginationParams, ValidationError,
};

/// Postal fields as they appear in request bodies
#[derive(Debug, Default, Deserialize)]
pub struct AddressFields {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl From<AddressFields> for PostalAddress {
    fn from(a: AddressFields) -> Self {
        Self {
            address: non_empty(a.address),
            city: non_empty(a.city),
            state: non_empty(a.state),
            zip: non_empty(a.zip),
            country: non_empty(a.country),
        }
    }
}

/// Create account request
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: AddressFields,
    #[serde(default)]
    pub created_by: Uuid,
}

impl TryFrom<CreateAccountRequest> for NewAccount {
    type Error = ValidationError;

    fn try_from(req: CreateAccountRequest) -> Result<Self, Self::Error> {
        required("name", &req.name)?;
        Ok(Self {
            name: req.name,
            industry: non_empty(req.industry),
            website: non_empty(req.website),
            phone: non_empty(req.phone),
            address: req.address.into(),
            created_by: required_id("created_by", req.created_by)?,
        })
    }
}

/// Update account request; absent or empty fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub address: AddressFields,
    #[serde(default)]
    pub updated_by: Uuid,
}

impl UpdateAccountRequest {
    fn into_patch(self) -> Result<(Uuid, AccountPatch), ValidationError> {
        let updated_by = required_id("updated_by", self.updated_by)?;
        let patch = AccountPatch {
            name: self.name,
            industry: self.industry,
            website: self.website,
            phone: self.phone,
            address: self.address.into(),
        };
        Ok((updated_by, patch))
    }
}

/// GET /accounts
async fn list_accounts(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Paginated<Account>>, ApiError> {
    let page = AccountRepo::new(&state.pool).list(Pagination::from(params)).await?;
    Ok(Json(page))
}

/// POST /accounts
async fn create_account(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let new = NewAccount::try_from(req)?;
    let account = AccountRepo::new(&state.pool).create(new).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /accounts/{id} - account with its contacts
async fn get_account(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<AccountDetail>, ApiError> {
    AccountRepo::new(&state.pool)
        .get_with_contacts(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("account"))
}

/// PUT /accounts/{id}
async fn update_account(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ValidJson(req): ValidJson<UpdateAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    let (updated_by, patch) = req.into_patch()?;
    let account = AccountRepo::new(&state.pool)
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("account"))?;

    tracing::info!(account_id = %id, %updated_by, "account updated");
    Ok(Json(account))
}

/// DELETE /accounts/{id}
async fn delete_account(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<MessageResponse>, ApiError> {
    AccountRepo::new(&state.pool).delete(id).await?;
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_requires_name_and_creator() {
        let req: CreateAccountRequest =
            serde_json::from_value(json!({"created_by": Uuid::new_v4()})).unwrap();
        assert_eq!(
            NewAccount::try_from(req).unwrap_err(),
            ValidationError::Empty { field: "name" }
        );

        let req: CreateAccountRequest = serde_json::from_value(json!({"name": "Acme"})).unwrap();
        assert_eq!(
            NewAccount::try_from(req).unwrap_err(),
            ValidationError::Empty { field: "created_by" }
        );
    }

    #[test]
    fn create_reads_flat_address() {
        let creator = Uuid::new_v4();
        let req: CreateAccountRequest = serde_json::from_value(json!({
            "name": "Acme",
            "city": "Springfield",
            "zip": "",
            "created_by": creator,
        }))
        .unwrap();

        let new = NewAccount::try_from(req).unwrap();
        assert_eq!(new.address.city.as_deref(), Some("Springfield"));
        assert_eq!(new.address.zip, None);
        assert_eq!(new.created_by, creator);
    }

    #[test]
    fn update_requires_updated_by() {
        let req: UpdateAccountRequest =
            serde_json::from_value(json!({"name": "Renamed"})).unwrap();
        assert_eq!(
            req.into_patch().unwrap_err(),
            ValidationError::Empty { field: "updated_by" }
        );
    }

    #[test]
    fn empty_update_fields_become_absent() {
        let req: UpdateAccountRequest = serde_json::from_value(json!({
            "name": "",
            "city": "",
            "updated_by": Uuid::new_v4(),
        }))
        .unwrap();

        let (_, patch) = req.into_patch().unwrap();
        assert_eq!(patch.address.city, None);
        // The repository coalesces empty strings, so either form keeps the value
        assert!(patch.name.as_deref().map_or(true, str::is_empty));
    }
}
