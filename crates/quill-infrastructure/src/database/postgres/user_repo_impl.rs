// ============================================================================
// Quill Infrastructure - PostgreSQL User Repository
// File: crates/quill-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================
//! PostgreSQL user repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use quill_core::domain::{Role, User};
use quill_core::error::AuthError;
use quill_core::repositories::UserRepository;

use super::{db_error, is_unique_violation};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AuthError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| AuthError::Internal(format!("unknown role '{}' for user {}", row.role, row.id)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding user by id", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding user by username", e))?;

        row.map(User::try_from).transpose()
    }

    async fn exists(&self, username: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("checking username", e))
    }

    async fn create(&self, user: &User) -> Result<User, AuthError> {
        info!("Creating user with username: {}", user.username);

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Username taken during insert: {}", user.username);
                AuthError::UserExists(user.username.clone())
            } else {
                db_error("creating user", e)
            }
        })?;

        info!("User created successfully: {}", row.id);
        row.try_into()
    }
}
