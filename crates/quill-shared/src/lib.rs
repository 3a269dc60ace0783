//! # Quill Shared
//! 
//! Shared configuration, telemetry, clock and common types for the Quill auth workspace.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::ManualClock;
pub use error::AppError;
pub use types::*;
