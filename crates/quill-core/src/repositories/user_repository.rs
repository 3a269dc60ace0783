//! User repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;
use crate::error::AuthError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
    async fn exists(&self, username: &str) -> Result<bool, AuthError>;
    /// Fails with [`AuthError::UserExists`] when the username is taken.
    async fn create(&self, user: &User) -> Result<User, AuthError>;
}
