//! # Quill Core
//! 
//! Domain entities, repository ports, and the session manager that owns the
//! token lifecycle: issue on login, revoke on logout or eviction, validate on
//! every request.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::{AuthError, ErrorKind};
pub use services::{LoginResult, SessionManager, SessionPolicy, SweepReport};
