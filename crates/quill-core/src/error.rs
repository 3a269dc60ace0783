//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username already exists: {0}")]
    UserExists(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Token is missing")]
    TokenMissing,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenBlacklisted,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The closed set of failure kinds callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UserExists,
    UserNotFound,
    InvalidPassword,
    TokenMissing,
    TokenInvalid,
    TokenExpired,
    TokenBlacklisted,
    Unauthorized,
    InternalFailure,
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserExists(_) => ErrorKind::UserExists,
            AuthError::UserNotFound => ErrorKind::UserNotFound,
            AuthError::InvalidPassword => ErrorKind::InvalidPassword,
            AuthError::TokenMissing => ErrorKind::TokenMissing,
            AuthError::TokenInvalid => ErrorKind::TokenInvalid,
            AuthError::TokenExpired => ErrorKind::TokenExpired,
            AuthError::TokenBlacklisted => ErrorKind::TokenBlacklisted,
            AuthError::Unauthorized(_) => ErrorKind::Unauthorized,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalFailure,
        }
    }
}

impl From<quill_security::JwtError> for AuthError {
    fn from(e: quill_security::JwtError) -> Self {
        match e {
            quill_security::JwtError::TokenExpired => AuthError::TokenExpired,
            quill_security::JwtError::ValidationError(_) => AuthError::TokenInvalid,
            quill_security::JwtError::CreationError(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<quill_security::PasswordError> for AuthError {
    fn from(e: quill_security::PasswordError) -> Self {
        AuthError::Internal(e.to_string())
    }
}
