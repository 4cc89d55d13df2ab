//! Business logic services for the application layer.

pub mod auth_service;
pub mod code_service;
pub mod ownership_guard;
pub mod scan_service;

pub use auth_service::AuthService;
pub use code_service::CodeService;
pub use ownership_guard::{Authorization, OwnershipGuard};
pub use scan_service::{ScanOutcome, ScanService};
