//! Application-wide constants

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 900;
pub const DEFAULT_MAX_SESSIONS_PER_USER: usize = 5;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

// Argon2id cost tuned so a single verification takes >100ms on commodity hardware.
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 65_536;
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 3;
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;

pub const MIN_JWT_SECRET_LENGTH: usize = 32;
pub const MIN_USERNAME_LENGTH: u64 = 3;
pub const MAX_USERNAME_LENGTH: u64 = 50;
pub const MIN_PASSWORD_LENGTH: u64 = 3;
pub const MAX_PASSWORD_LENGTH: u64 = 128;
pub const MAX_USER_AGENT_LENGTH: usize = 512;

pub const BEARER_PREFIX: &str = "Bearer ";
