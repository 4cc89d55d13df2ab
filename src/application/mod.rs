//! Application layer services implementing business logic.
//!
//! Services consume repository traits and give HTTP handlers and the admin CLI
//! a small API that always takes the acting owner explicitly.
//!
//! # Available Services
//!
//! - [`services::CodeService`] - Batch minting, listing, renaming, deletion
//! - [`services::OwnershipGuard`] - Ownership precondition for owner-facing calls
//! - [`services::ScanService`] - Scan resolution and notification hand-off
//! - [`services::AuthService`] - Bearer credential authentication

pub mod services;
