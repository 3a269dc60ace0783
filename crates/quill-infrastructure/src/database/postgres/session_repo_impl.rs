// ============================================================================
// Quill Infrastructure - PostgreSQL Session Ledger
// File: crates/quill-infrastructure/src/database/postgres/session_repo_impl.rs
// ============================================================================
//! PostgreSQL session ledger
//!
//! `seq` is an identity column filled on insert; it orders sessions that
//! share a `created_at`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use quill_core::domain::{Session, SessionRotation};
use quill_core::error::AuthError;
use quill_core::repositories::SessionRepository;

use super::db_error;
use super::revocation_repo_impl::insert_revoked;

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    token: String,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    user_agent: Option<String>,
    ip_address: Option<String>,
    is_active: bool,
    seq: i64,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            created_at: row.created_at,
            last_activity: row.last_activity,
            expires_at: row.expires_at,
            user_agent: row.user_agent,
            ip_address: row.ip_address,
            is_active: row.is_active,
            seq: row.seq,
        }
    }
}

async fn insert_session<'e, E>(executor: E, session: &Session) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO sessions (
            id, user_id, token, created_at, last_activity, expires_at,
            user_agent, ip_address, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.token)
    .bind(session.created_at)
    .bind(session.last_activity)
    .bind(session.expires_at)
    .bind(&session.user_agent)
    .bind(&session.ip_address)
    .bind(session.is_active)
    .execute(executor)
    .await?;
    Ok(())
}

async fn deactivate_session<'e, E>(executor: E, token: &str) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE sessions SET is_active = FALSE WHERE token = $1")
        .bind(token)
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), AuthError> {
        insert_session(&self.pool, session)
            .await
            .map_err(|e| db_error("creating session", e))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, token, created_at, last_activity, expires_at,
                   user_agent, ip_address, is_active, seq
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding session by token", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, AuthError> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, token, created_at, last_activity, expires_at,
                   user_agent, ip_address, is_active, seq
            FROM sessions
            WHERE user_id = $1 AND is_active = TRUE AND expires_at > $2
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing active sessions", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn deactivate(&self, token: &str) -> Result<(), AuthError> {
        deactivate_session(&self.pool, token)
            .await
            .map_err(|e| db_error("deactivating session", e))
    }

    async fn touch(&self, token: &str, at: DateTime<Utc>) -> Result<(), AuthError> {
        sqlx::query("UPDATE sessions SET last_activity = $2 WHERE token = $1 AND is_active = TRUE")
            .bind(token)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("updating last activity", e))?;
        Ok(())
    }

    async fn apply_rotation(&self, rotation: &SessionRotation) -> Result<(), AuthError> {
        if rotation.is_empty() {
            return Ok(());
        }

        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting rotation", e))?;

        for revoked in &rotation.evicted {
            deactivate_session(&mut *transaction, &revoked.token)
                .await
                .map_err(|e| db_error("deactivating evicted session", e))?;
            insert_revoked(&mut *transaction, revoked)
                .await
                .map_err(|e| db_error("revoking evicted token", e))?;
        }

        if let Some(session) = &rotation.issued {
            insert_session(&mut *transaction, session)
                .await
                .map_err(|e| db_error("inserting session", e))?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| db_error("committing rotation", e))?;

        debug!(
            evicted = rotation.evicted.len(),
            issued = rotation.issued.is_some(),
            "Session rotation committed"
        );
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("purging sessions", e))?;
        Ok(result.rows_affected())
    }
}
