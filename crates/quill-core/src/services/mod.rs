//! Domain services (business logic)

pub mod session_manager;

pub use session_manager::{LoginResult, SessionManager, SessionPolicy, SweepReport};
