//! Repository trait definitions for the domain layer.
//!
//! These traits abstract persistence and artifact storage. Concrete
//! implementations live in `crate::infrastructure`.
//!
//! # Available Repositories
//!
//! - [`CodeRepository`] - Ownership-scoped code records and the atomic scan counter
//! - [`OwnerRepository`] - Owner lookup by credential digest
//! - [`AssetStore`] - Rendered visual-code artifacts
//!
//! Mock implementations are generated with `mockall` under `cfg(test)`.

pub mod asset_store;
pub mod code_repository;
pub mod owner_repository;

pub use asset_store::AssetStore;
pub use code_repository::CodeRepository;
pub use owner_repository::OwnerRepository;

#[cfg(test)]
pub use asset_store::MockAssetStore;
#[cfg(test)]
pub use code_repository::MockCodeRepository;
#[cfg(test)]
pub use owner_repository::MockOwnerRepository;
