//! User domain entity

use chrono::{DateTime, Utc};
use quill_shared::{new_id, Role};
use serde::Serialize;
use uuid::Uuid;

/// A registered account. Never mutated by the auth core once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            username,
            password_hash,
            role,
            created_at,
        }
    }
}

/// User info returned in auth responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}
