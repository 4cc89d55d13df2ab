//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`assets`] - Filesystem storage for rendered QR codes
//! - [`cache`] - Redirect lookup cache (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod assets;
pub mod cache;
pub mod persistence;
