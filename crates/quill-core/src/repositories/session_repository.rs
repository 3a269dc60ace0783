//! Session ledger trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Session, SessionRotation};
use crate::error::AuthError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), AuthError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, AuthError>;

    /// Live sessions of a user, oldest first.
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, AuthError>;

    /// Marks the session inactive. `expires_at` is left as is.
    async fn deactivate(&self, token: &str) -> Result<(), AuthError>;

    async fn touch(&self, token: &str, at: DateTime<Utc>) -> Result<(), AuthError>;

    /// Applies a rotation all-or-nothing: every evicted token is revoked and
    /// its session deactivated, then the issued session (if any) is inserted.
    async fn apply_rotation(&self, rotation: &SessionRotation) -> Result<(), AuthError>;

    /// Deletes rows whose expiry is at or before `now`. Returns the count.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
