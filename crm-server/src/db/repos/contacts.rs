//! Contact repository
//!
//! `account_id` is a nullable reference: it is overwritten on every
//! update (including being cleared) while text fields coalesce.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{DbError, Entity, PostalAddress, Repo};

macro_rules! contact_columns {
    () => {
        "id, first_name, last_name, email, phone, title, account_id, \
         address, city, state, zip, country, created_by, created_at, updated_at"
    };
}

/// Contact record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub address: PostalAddress,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Contact {
    const RESOURCE: &'static str = "contact";
    const TABLE: &'static str = "contacts";
    const COLUMNS: &'static str = contact_columns!();
    const ORDER_BY: &'static str = "last_name, first_name";
}

/// Fields for a new contact
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub account_id: Option<Uuid>,
    pub address: PostalAddress,
    pub created_by: Uuid,
}

/// Partial update; text `None` keeps the stored value, `account_id` is always written
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub account_id: Option<Uuid>,
    pub address: PostalAddress,
}

/// Contact repository
pub type ContactRepo<'a> = Repo<'a, Contact>;

impl<'a> Repo<'a, Contact> {
    pub async fn create(&self, new: NewContact) -> Result<Contact, DbError> {
        let contact = sqlx::query_as::<_, Contact>(concat!(
            "INSERT INTO contacts \
             (first_name, last_name, email, phone, title, account_id, \
              address, city, state, zip, country, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING ",
            contact_columns!()
        ))
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.title)
        .bind(new.account_id)
        .bind(&new.address.address)
        .bind(&new.address.city)
        .bind(&new.address.state)
        .bind(&new.address.zip)
        .bind(&new.address.country)
        .bind(new.created_by)
        .fetch_one(self.pool())
        .await?;

        Ok(contact)
    }

    /// Patch a contact; `None` when no contact has this id.
    pub async fn update(&self, id: Uuid, patch: ContactPatch) -> Result<Option<Contact>, DbError> {
        let contact = sqlx::query_as::<_, Contact>(concat!(
            "UPDATE contacts SET \
             first_name = COALESCE(NULLIF($1, ''), first_name), \
             last_name = COALESCE(NULLIF($2, ''), last_name), \
             email = COALESCE(NULLIF($3, ''), email), \
             phone = COALESCE(NULLIF($4, ''), phone), \
             title = COALESCE(NULLIF($5, ''), title), \
             account_id = $6, \
             address = COALESCE(NULLIF($7, ''), address), \
             city = COALESCE(NULLIF($8, ''), city), \
             state = COALESCE(NULLIF($9, ''), state), \
             zip = COALESCE(NULLIF($10, ''), zip), \
             country = COALESCE(NULLIF($11, ''), country), \
             updated_at = NOW() \
             WHERE id = $12 \
             RETURNING ",
            contact_columns!()
        ))
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.title)
        .bind(patch.account_id)
        .bind(&patch.address.address)
        .bind(&patch.address.city)
        .bind(&patch.address.state)
        .bind(&patch.address.zip)
        .bind(&patch.address.country)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(contact)
    }

    /// Contacts belonging to an account, by last then first name.
    pub async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Contact>, DbError> {
        self.list_by("account_id", account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_without_unset_account() {
        let contact = Contact {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: Some("ada@example.com".into()),
            phone: None,
            title: None,
            account_id: None,
            address: PostalAddress::default(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(contact).unwrap();
        assert_eq!(json["first_name"], "Ada");
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("account_id").is_none());
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn ordered_by_last_then_first() {
        assert_eq!(Contact::ORDER_BY, "last_name, first_name");
    }
}
