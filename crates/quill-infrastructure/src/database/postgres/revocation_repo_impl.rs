// ============================================================================
// Quill Infrastructure - PostgreSQL Revocation List
// File: crates/quill-infrastructure/src/database/postgres/revocation_repo_impl.rs
// ============================================================================
//! PostgreSQL revocation list

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use quill_core::domain::RevokedToken;
use quill_core::error::AuthError;
use quill_core::repositories::RevocationRepository;

use super::db_error;

pub struct PgRevocationRepository {
    pool: PgPool,
}

impl PgRevocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Upsert that never shortens an existing revocation.
pub(crate) async fn insert_revoked<'e, E>(executor: E, revoked: &RevokedToken) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO revoked_tokens (token, user_id, expires_at, reason, revoked_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (token) DO UPDATE
        SET expires_at = GREATEST(revoked_tokens.expires_at, EXCLUDED.expires_at)
        "#,
    )
    .bind(&revoked.token)
    .bind(revoked.user_id)
    .bind(revoked.expires_at)
    .bind(revoked.reason.as_str())
    .bind(revoked.revoked_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl RevocationRepository for PgRevocationRepository {
    async fn insert(&self, revoked: &RevokedToken) -> Result<(), AuthError> {
        insert_revoked(&self.pool, revoked)
            .await
            .map_err(|e| db_error("revoking token", e))
    }

    async fn is_revoked(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token = $1 AND expires_at > $2)",
        )
        .bind(token)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("checking revocation", e))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("purging revoked tokens", e))?;
        Ok(result.rows_affected())
    }
}
