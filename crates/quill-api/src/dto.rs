//! Request and response payloads

use chrono::{DateTime, Utc};
use quill_core::{Role, Session, UserInfo};
use quill_shared::constants::{
    MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = MIN_USERNAME_LENGTH, max = MAX_USERNAME_LENGTH))]
    pub username: String,
    #[validate(length(min = MIN_PASSWORD_LENGTH, max = MAX_PASSWORD_LENGTH))]
    pub password: String,
    /// `user` or `admin`; defaults to `user`.
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    pub fn parsed_role(&self) -> Result<Role, ApiError> {
        match self.role.as_deref() {
            None => Ok(Role::default()),
            Some(raw) => Role::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("unknown role '{}'", raw))),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH))]
    pub username: String,
    #[validate(length(min = 1, max = MAX_PASSWORD_LENGTH))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    /// True for the session the request was made with.
    pub current: bool,
}

impl SessionDto {
    pub fn from_session(session: Session, current_token: &str) -> Self {
        Self {
            current: session.token == current_token,
            id: session.id,
            created_at: session.created_at,
            last_activity: session.last_activity,
            expires_at: session.expires_at,
            user_agent: session.user_agent,
            ip_address: session.ip_address,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevokeSessionsResponse {
    pub username: String,
    pub revoked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
            role: role.map(Into::into),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("alice", "pw1", None).validate().is_ok());
        assert!(register("al", "pw1", None).validate().is_err());
        assert!(register("alice", "pw", None).validate().is_err());
        assert!(register(&"a".repeat(51), "pw1", None).validate().is_err());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(register("alice", "pw1", None).parsed_role().unwrap(), Role::User);
        assert_eq!(register("bob", "pw2", Some("admin")).parsed_role().unwrap(), Role::Admin);
        assert!(matches!(
            register("eve", "pw3", Some("root")).parsed_role(),
            Err(ApiError::Validation(_))
        ));
    }
}
