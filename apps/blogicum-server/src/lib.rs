//! # Blogicum Server
//!
//! Actix-web application for the Blogicum blog: configuration, shared state,
//! telemetry, middleware and the HTTP handlers.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
