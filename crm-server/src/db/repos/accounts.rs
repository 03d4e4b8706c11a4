//! Account repository
//!
//! - update: text fields coalesce, so absent or empty keeps the stored value
//! - get_with_contacts: account plus its contacts, ordered by name

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{Contact, ContactRepo, DbError, Entity, PostalAddress, Repo};

macro_rules! account_columns {
    () => {
        "id, name, industry, website, phone, address, city, state, zip, country, \
         created_by, created_at, updated_at"
    };
}

/// Account record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub address: PostalAddress,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Account {
    const RESOURCE: &'static str = "account";
    const TABLE: &'static str = "accounts";
    const COLUMNS: &'static str = account_columns!();
    const ORDER_BY: &'static str = "name";
}

/// Account with its contacts
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
}

/// Fields for a new account
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: PostalAddress,
    pub created_by: Uuid,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: PostalAddress,
}

/// Account repository
pub type AccountRepo<'a> = Repo<'a, Account>;

impl<'a> Repo<'a, Account> {
    pub async fn create(&self, new: NewAccount) -> Result<Account, DbError> {
        let account = sqlx::query_as::<_, Account>(concat!(
            "INSERT INTO accounts \
             (name, industry, website, phone, address, city, state, zip, country, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING ",
            account_columns!()
        ))
        .bind(&new.name)
        .bind(&new.industry)
        .bind(&new.website)
        .bind(&new.phone)
        .bind(&new.address.address)
        .bind(&new.address.city)
        .bind(&new.address.state)
        .bind(&new.address.zip)
        .bind(&new.address.country)
        .bind(new.created_by)
        .fetch_one(self.pool())
        .await?;

        Ok(account)
    }

    /// Patch an account; `None` when no account has this id.
    pub async fn update(&self, id: Uuid, patch: AccountPatch) -> Result<Option<Account>, DbError> {
        let account = sqlx::query_as::<_, Account>(concat!(
            "UPDATE accounts SET \
             name = COALESCE(NULLIF($1, ''), name), \
             industry = COALESCE(NULLIF($2, ''), industry), \
             website = COALESCE(NULLIF($3, ''), website), \
             phone = COALESCE(NULLIF($4, ''), phone), \
             address = COALESCE(NULLIF($5, ''), address), \
             city = COALESCE(NULLIF($6, ''), city), \
             state = COALESCE(NULLIF($7, ''), state), \
             zip = COALESCE(NULLIF($8, ''), zip), \
             country = COALESCE(NULLIF($9, ''), country), \
             updated_at = NOW() \
             WHERE id = $10 \
             RETURNING ",
            account_columns!()
        ))
        .bind(&patch.name)
        .bind(&patch.industry)
        .bind(&patch.website)
        .bind(&patch.phone)
        .bind(&patch.address.address)
        .bind(&patch.address.city)
        .bind(&patch.address.state)
        .bind(&patch.address.zip)
        .bind(&patch.address.country)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(account)
    }

    /// Get an account together with its contacts.
    pub async fn get_with_contacts(&self, id: Uuid) -> Result<Option<AccountDetail>, DbError> {
        let Some(account) = self.get(id).await? else {
            return Ok(None);
        };
        let contacts = ContactRepo::new(self.pool()).list_for_account(id).await?;

        Ok(Some(AccountDetail { account, contacts }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            industry: None,
            website: Some("https://acme.test".into()),
            phone: None,
            address: PostalAddress::default(),
            created_by: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn serializes_flat_and_omits_absent_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["name"], "Acme");
        assert_eq!(json["website"], "https://acme.test");
        assert!(json.get("industry").is_none());
        assert!(json.get("address").is_none());
        assert!(json.get("created_at").is_some());
    }

    #[test]
    fn detail_omits_empty_contacts() {
        let detail = AccountDetail {
            account: sample(),
            contacts: vec![],
        };
        let json = serde_json::to_value(detail).unwrap();
        assert!(json.get("contacts").is_none());
        assert_eq!(json["name"], "Acme");
    }

    #[test]
    fn columns_start_with_id() {
        assert!(Account::COLUMNS.starts_with("id, name"));
    }
}
