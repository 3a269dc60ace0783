//! # Quill Core - Domain Module
//! 
//! Domain entities for the auth layer.

pub mod identity;
pub mod revoked_token;
pub mod session;
pub mod user;

// Re-export all entities and enums
pub use identity::AuthenticatedUser;
pub use quill_shared::Role;
pub use revoked_token::{RevocationReason, RevokedToken};
pub use session::{ClientInfo, Session, SessionRotation};
pub use user::{User, UserInfo};
