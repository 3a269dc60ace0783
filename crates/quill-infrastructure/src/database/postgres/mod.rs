//! PostgreSQL repository implementations

pub mod revocation_repo_impl;
pub mod session_repo_impl;
pub mod user_repo_impl;

pub use revocation_repo_impl::PgRevocationRepository;
pub use session_repo_impl::PgSessionRepository;
pub use user_repo_impl::PgUserRepository;

use quill_core::error::AuthError;
use tracing::error;

/// Logs and wraps a driver error for the domain.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> AuthError {
    error!("Database error {}: {}", context, e);
    AuthError::Database(e.to_string())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
