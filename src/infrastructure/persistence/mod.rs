//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx with bound
//! parameters and `FromRow` mapping.
//!
//! # Repositories
//!
//! - [`PgCodeRepository`] - Code records and the atomic scan counter
//! - [`PgOwnerRepository`] - Owners and credential digests
//!

pub mod pg_code_repository;
pub mod pg_owner_repository;

pub use pg_code_repository::PgCodeRepository;
pub use pg_owner_repository::PgOwnerRepository;
