//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blogicum-core`.
//! This crate contains the PostgreSQL repositories, the in-memory store used
//! when no database is configured, and the authentication services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use memory::MemoryStore;

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
