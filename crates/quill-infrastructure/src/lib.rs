//! # Quill Infrastructure
//! 
//! Storage adapters for the repository ports: PostgreSQL via sqlx and an
//! in-memory store for development and tests.

pub mod database;
pub mod memory;

pub use database::{
    create_pool, run_migrations, PgRevocationRepository, PgSessionRepository, PgUserRepository,
};
pub use memory::InMemoryStore;
