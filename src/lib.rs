//! MentorHub API - Mentorship marketplace backend
//!
//! This crate implements the authentication and session-lifecycle
//! service of the marketplace: registration, login, access/refresh
//! token issuance, refresh-token rotation and logout, built as a
//! layered domain model.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and value objects
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, Unit of Work)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (response wrappers)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Email, HashedPassword, RefreshToken, User, UserId, UserRole};
pub use errors::{AppError, AppResult};
