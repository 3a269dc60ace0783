//! Revocation list trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::RevokedToken;
use crate::error::AuthError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevocationRepository: Send + Sync {
    /// Idempotent. Re-revoking keeps the later of the two expiries.
    async fn insert(&self, revoked: &RevokedToken) -> Result<(), AuthError>;

    /// True while a revocation for `token` is in force at `now`.
    async fn is_revoked(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthError>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
