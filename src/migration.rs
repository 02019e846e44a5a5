//! Landlord schema DDL. Idempotent; safe to run on every boot.

use crate::error::AdminError;
use sqlx::PgPool;

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tenants (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        description TEXT,
        start_date DATE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        tenant_id BIGINT REFERENCES tenants (id),
        name TEXT NOT NULL,
        email TEXT,
        password TEXT,
        role TEXT NOT NULL DEFAULT 'user',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        tenant_id BIGINT REFERENCES tenants (id),
        locale TEXT NOT NULL DEFAULT 'es',
        timezone TEXT NOT NULL DEFAULT 'UTC',
        notifications BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS users_tenant_id_idx ON users (tenant_id)",
    "CREATE INDEX IF NOT EXISTS settings_tenant_id_idx ON settings (tenant_id)",
];

pub async fn apply_migrations(pool: &PgPool) -> Result<(), AdminError> {
    for sql in TABLES {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
