//! Authenticated identity handed to callers after a successful validation.

use quill_shared::Role;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admin satisfies any requirement; otherwise the role must match exactly.
    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        if self.role == role || self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized(format!(
                "role '{}' required, caller has '{}'",
                role, self.role
            )))
        }
    }
}
