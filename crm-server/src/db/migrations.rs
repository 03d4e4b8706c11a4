//! Schema bootstrap for the CRM tables
//!
//! Statements are idempotent (`IF NOT EXISTS`), so `run` is safe on every
//! startup. `drop_all` removes the tables in reverse dependency order.

use sqlx::PgPool;

use super::repos::DbError;

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "accounts",
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            industry TEXT,
            website TEXT,
            phone TEXT,
            address TEXT,
            city TEXT,
            state TEXT,
            zip TEXT,
            country TEXT,
            created_by UUID,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "contacts",
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            title TEXT,
            account_id UUID REFERENCES accounts(id) ON DELETE SET NULL,
            address TEXT,
            city TEXT,
            state TEXT,
            zip TEXT,
            country TEXT,
            created_by UUID,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "opportunities",
        r#"
        CREATE TABLE IF NOT EXISTS opportunities (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            opportunity_name TEXT NOT NULL,
            account_id UUID REFERENCES accounts(id) ON DELETE CASCADE,
            primary_contact_id UUID REFERENCES contacts(id) ON DELETE SET NULL,
            stage TEXT NOT NULL,
            amount DOUBLE PRECISION,
            close_date DATE,
            probability DOUBLE PRECISION,
            created_by UUID,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "notes",
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            content TEXT NOT NULL,
            created_by UUID,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "note_associations",
        r#"
        CREATE TABLE IF NOT EXISTS note_associations (
            note_id UUID NOT NULL REFERENCES notes(id),
            record_id UUID NOT NULL,
            record_type TEXT NOT NULL
                CHECK (record_type IN ('account', 'contact', 'opportunity')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (note_id, record_id, record_type)
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_accounts_name ON accounts(name)",
    "CREATE INDEX IF NOT EXISTS idx_contacts_account ON contacts(account_id)",
    "CREATE INDEX IF NOT EXISTS idx_contacts_name ON contacts(last_name, first_name)",
    "CREATE INDEX IF NOT EXISTS idx_opportunities_account ON opportunities(account_id)",
    "CREATE INDEX IF NOT EXISTS idx_opportunities_close ON opportunities(close_date, opportunity_name)",
    "CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_note_associations_record ON note_associations(record_id, record_type)",
];

/// Create every table and index that does not exist yet.
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("running CRM migrations");

    for (table, ddl) in TABLES {
        tracing::debug!(table, "ensuring table");
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!(tables = TABLES.len(), "CRM migrations complete");
    Ok(())
}

/// Drop every CRM table. Data is lost.
pub async fn drop_all(pool: &PgPool) -> Result<(), DbError> {
    tracing::warn!("dropping CRM tables");

    for (table, _) in TABLES.iter().rev() {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(pool)
            .await?;
    }
    Ok(())
}
