//! Opportunity endpoints

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
use crate::db::repos::{NewOpportunity, Opportunity, OpportunityPatch, OpportunityRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery, ValidUuid};
use crate::http::server::AppState;
use crate::models::{required, required_id, Paginated, Pagination, PaginationParams, ValidationError};

#[derive(Debug, Deserialize)]
pub struct CreateOpportunityRequest {
    #[serde(default)]
    pub opportunity_name: String,
    #[serde(default)]
    pub account_id: Uuid,
    pub primary_contact_id: Option<Uuid>,
    #[serde(default)]
    pub stage: String,
    pub amount: Option<f64>,
    pub close_date: Option<String>,
    pub probability: Option<f64>,
    #[serde(default)]
    pub created_by: Uuid,
}

impl TryFrom<CreateOpportunityRequest> for NewOpportunity {
    type Error = ValidationError;

    fn try_from(req: CreateOpportunityRequest) -> Result<Self, Self::Error> {
        required("opportunity_name", &req.opportunity_name)?;
        let account_id = required_id("account_id", req.account_id)?;
        required("stage", &req.stage)?;

        Ok(Self {
            opportunity_name: req.opportunity_name,
            account_id,
            primary_contact_id: req.primary_contact_id.filter(|id| !id.is_nil()),
            stage: req.stage,
            amount: req.amount,
            close_date: req.close_date,
            probability: req.probability,
            created_by: required_id("created_by", req.created_by)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateOpportunityRequest {
    pub opportunity_name: Option<String>,
    pub account_id: Option<Uuid>,
    pub primary_contact_id: Option<Uuid>,
    pub stage: Option<String>,
    pub amount: Option<f64>,
    pub close_date: Option<String>,
    pub probability: Option<f64>,
    #[serde(default)]
    pub updated_by: Uuid,
}

impl UpdateOpportunityRequest {
    fn into_patch(self) -> Result<(Uuid, OpportunityPatch), ValidationError> {
        let updated_by = required_id("updated_by", self.updated_by)?;
        let patch = OpportunityPatch {
            opportunity_name: self.opportunity_name,
            account_id: self.account_id.filter(|id| !id.is_nil()),
            primary_contact_id: self.primary_contact_id.filter(|id| !id.is_nil()),
            stage: self.stage,
            amount: self.amount,
            close_date: self.close_date,
            probability: self.probability,
        };
        Ok((updated_by, patch))
    }
}

/// GET /opportunities
async fn list_opportunities(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Paginated<Opportunity>>, ApiError> {
    let page = OpportunityRepo::new(&state.pool)
        .list(Pagination::from(params))
        .await?;
    Ok(Json(page))
}

/// POST /opportunities
async fn create_opportunity(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateOpportunityRequest>,
) -> Result<(StatusCode, Json<Opportunity>), ApiError> {
    let new = NewOpportunity::try_from(req)?;
    let opportunity = OpportunityRepo::new(&state.pool).create(new).await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// GET /opportunities/{id}
async fn get_opportunity(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Opportunity>, ApiError> {
    OpportunityRepo::new(&state.pool)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("opportunity"))
}

/// PUT /opportunities/{id}
async fn update_opportunity(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ValidJson(req): ValidJson<UpdateOpportunityRequest>,
) -> Result<Json<Opportunity>, ApiError> {
    let (updated_by, patch) = req.into_patch()?;
    let opportunity = OpportunityRepo::new(&state.pool)
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("opportunity"))?;

    tracing::info!(opportunity_id = %id, %updated_by, "opportunity updated");
    Ok(Json(opportunity))
}

/// DELETE /opportunities/{id}
async fn delete_opportunity(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<MessageResponse>, ApiError> {
    OpportunityRepo::new(&state.pool).delete(id).await?;
    Ok(Json(MessageResponse::new("Opportunity deleted successfully")))
}

/// GET /opportunities/account/{id} - bare array
async fn opportunities_for_account(
    State(state): State<Arc<AppState>>,
    ValidUuid(account_id): ValidUuid,
) -> Result<Json<Vec<Opportunity>>, ApiError> {
    let opportunities = OpportunityRepo::new(&state.pool)
        .list_for_account(account_id)
        .await?;
    Ok(Json(opportunities))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/opportunities",
            get(list_opportunities).post(create_opportunity),
        )
        .route(
            "/opportunities/{id}",
            get(get_opportunity)
                .put(update_opportunity)
                .delete(delete_opportunity),
        )
        .route("/opportunities/account/{id}", get(opportunities_for_account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn account_is_required_on_create() {
        let req: CreateOpportunityRequest = serde_json::from_value(json!({
            "opportunity_name": "Renewal",
            "stage": "Prospecting",
            "created_by": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(
            NewOpportunity::try_from(req).unwrap_err(),
            ValidationError::Empty { field: "account_id" }
        );
    }

    #[test]
    fn create_passes_numbers_through() {
        let req: CreateOpportunityRequest = serde_json::from_value(json!({
            "opportunity_name": "Renewal",
            "account_id": Uuid::new_v4(),
            "stage": "Negotiation",
            "amount": 12000.0,
            "close_date": "2025-09-30",
            "probability": 0,
            "created_by": Uuid::new_v4(),
        }))
        .unwrap();

        let new = NewOpportunity::try_from(req).unwrap();
        assert_eq!(new.amount, Some(12000.0));
        assert_eq!(new.probability, Some(0.0));
        assert_eq!(new.close_date.as_deref(), Some("2025-09-30"));
    }

    #[test]
    fn update_overwrites_references() {
        let req: UpdateOpportunityRequest = serde_json::from_value(json!({
            "stage": "Closed Won",
            "updated_by": Uuid::new_v4(),
        }))
        .unwrap();
        let (_, patch) = req.into_patch().unwrap();
        assert_eq!(patch.account_id, None);
        assert_eq!(patch.amount, None);
        assert_eq!(patch.stage.as_deref(), Some("Closed Won"));
    }
}
