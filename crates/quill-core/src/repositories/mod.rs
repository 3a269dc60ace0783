//! Repository traits (ports)

pub mod revocation_repository;
pub mod session_repository;
pub mod user_repository;

pub use revocation_repository::RevocationRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use revocation_repository::MockRevocationRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
