//! Opportunity repository
//!
//! - `close_date` arrives as `YYYY-MM-DD`; parse failures are validation errors
//! - zero `amount`/`probability` are stored as NULL
//! - update overwrites references, numbers and the close date every time

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::parse_close_date;

use super::{DbError, Entity, Repo};

macro_rules! opportunity_columns {
    () => {
        "id, opportunity_name, account_id, primary_contact_id, stage, amount, \
         close_date, probability, created_by, created_at, updated_at"
    };
}

/// Opportunity record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Opportunity {
    pub id: Uuid,
    pub opportunity_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_contact_id: Option<Uuid>,
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Opportunity {
    const RESOURCE: &'static str = "opportunity";
    const TABLE: &'static str = "opportunities";
    const COLUMNS: &'static str = opportunity_columns!();
    const ORDER_BY: &'static str = "close_date, opportunity_name";
}

/// Fields for a new opportunity
#[derive(Debug, Clone, Default)]
pub struct NewOpportunity {
    pub opportunity_name: String,
    pub account_id: Uuid,
    pub primary_contact_id: Option<Uuid>,
    pub stage: String,
    pub amount: Option<f64>,
    /// Raw `YYYY-MM-DD` string; empty means no date
    pub close_date: Option<String>,
    pub probability: Option<f64>,
    pub created_by: Uuid,
}

/// Partial update
///
/// Name and stage coalesce; every other field is written as given.
#[derive(Debug, Clone, Default)]
pub struct OpportunityPatch {
    pub opportunity_name: Option<String>,
    pub account_id: Option<Uuid>,
    pub primary_contact_id: Option<Uuid>,
    pub stage: Option<String>,
    pub amount: Option<f64>,
    pub close_date: Option<String>,
    pub probability: Option<f64>,
}

/// Zero means "not set".
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Opportunity repository
pub type OpportunityRepo<'a> = Repo<'a, Opportunity>;

impl<'a> Repo<'a, Opportunity> {
    pub async fn create(&self, new: NewOpportunity) -> Result<Opportunity, DbError> {
        let close_date = parse_close_date(new.close_date.as_deref())?;

        let opportunity = sqlx::query_as::<_, Opportunity>(concat!(
            "INSERT INTO opportunities \
             (opportunity_name, account_id, primary_contact_id, stage, amount, \
              close_date, probability, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING ",
            opportunity_columns!()
        ))
        .bind(&new.opportunity_name)
        .bind(new.account_id)
        .bind(new.primary_contact_id)
        .bind(&new.stage)
        .bind(nonzero(new.amount))
        .bind(close_date)
        .bind(nonzero(new.probability))
        .bind(new.created_by)
        .fetch_one(self.pool())
        .await?;

        Ok(opportunity)
    }

    /// Patch an opportunity; `None` when no opportunity has this id.
    pub async fn update(
        &self,
        id: Uuid,
        patch: OpportunityPatch,
    ) -> Result<Option<Opportunity>, DbError> {
        let close_date = parse_close_date(patch.close_date.as_deref())?;

        let opportunity = sqlx::query_as::<_, Opportunity>(concat!(
            "UPDATE opportunities SET \
             opportunity_name = COALESCE(NULLIF($1, ''), opportunity_name), \
             account_id = $2, \
             primary_contact_id = $3, \
             stage = COALESCE(NULLIF($4, ''), stage), \
             amount = $5, \
             close_date = $6, \
             probability = $7, \
             updated_at = NOW() \
             WHERE id = $8 \
             RETURNING ",
            opportunity_columns!()
        ))
        .bind(&patch.opportunity_name)
        .bind(patch.account_id)
        .bind(patch.primary_contact_id)
        .bind(&patch.stage)
        .bind(nonzero(patch.amount))
        .bind(close_date)
        .bind(nonzero(patch.probability))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(opportunity)
    }

    /// Opportunities for an account, by close date then name.
    pub async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Opportunity>, DbError> {
        self.list_by("account_id", account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_set() {
        assert_eq!(nonzero(Some(0.0)), None);
        assert_eq!(nonzero(None), None);
        assert_eq!(nonzero(Some(1500.5)), Some(1500.5));
    }

    #[test]
    fn close_date_serializes_as_calendar_date() {
        let opportunity = Opportunity {
            id: Uuid::new_v4(),
            opportunity_name: "Renewal".into(),
            account_id: Some(Uuid::new_v4()),
            primary_contact_id: None,
            stage: "Prospecting".into(),
            amount: None,
            close_date: NaiveDate::from_ymd_opt(2025, 6, 30),
            probability: Some(0.4),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(opportunity).unwrap();
        assert_eq!(json["close_date"], "2025-06-30");
        assert_eq!(json["probability"], 0.4);
        assert!(json.get("amount").is_none());
        assert!(json.get("primary_contact_id").is_none());
    }
}
