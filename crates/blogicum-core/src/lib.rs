//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog.
//! This crate contains the publication rules, ownership checks and pagination
//! math, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;

pub use error::DomainError;
pub use pagination::{Page, PageRequest};
