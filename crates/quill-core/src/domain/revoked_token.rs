//! Revocation list entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a token was revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    Logout,
    NewLogin,
    Forced,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Logout => "logout",
            RevocationReason::NewLogin => "new_login",
            RevocationReason::Forced => "forced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "logout" => Some(RevocationReason::Logout),
            "new_login" => Some(RevocationReason::NewLogin),
            "forced" => Some(RevocationReason::Forced),
            _ => None,
        }
    }
}

/// A token that must be rejected until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub reason: RevocationReason,
    pub revoked_at: DateTime<Utc>,
}

impl RevokedToken {
    pub fn is_in_force_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
