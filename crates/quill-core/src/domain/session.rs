//! Session ledger entity
//!
//! One row per issued token. A session is *live* while it is active and its
//! expiry lies in the future; only live sessions count toward the per-user cap.
//! Deactivation flips `is_active` and leaves `expires_at` untouched so the row
//! survives as an audit record until the sweep removes it.

use chrono::{DateTime, Utc};
use quill_shared::new_id;
use serde::Serialize;
use uuid::Uuid;

use super::revoked_token::RevokedToken;

/// Client metadata captured at login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub is_active: bool,
    /// Issuance order assigned by the store. Breaks ties between sessions
    /// created at the same instant.
    #[serde(skip_serializing)]
    pub seq: i64,
}

impl Session {
    pub fn new(
        user_id: Uuid,
        token: String,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        client: ClientInfo,
    ) -> Self {
        Self {
            id: new_id(),
            user_id,
            token,
            created_at: now,
            last_activity: now,
            expires_at,
            user_agent: client.user_agent,
            ip_address: client.ip_address,
            is_active: true,
            seq: 0,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// Sort key for oldest-first ordering.
    pub fn issue_order(&self) -> (DateTime<Utc>, i64) {
        (self.created_at, self.seq)
    }
}

/// A batch of ledger changes that must persist together: every evicted
/// session is deactivated and revoked, and the replacement (if any) inserted.
#[derive(Debug, Clone, Default)]
pub struct SessionRotation {
    pub evicted: Vec<RevokedToken>,
    pub issued: Option<Session>,
}

impl SessionRotation {
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty() && self.issued.is_none()
    }
}
