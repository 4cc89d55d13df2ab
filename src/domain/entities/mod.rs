//! Core domain entities.
//!
//! Entities are plain data structures without behaviour beyond small accessors.
//!
//! # Entity Types
//!
//! - [`Owner`] - An identity that mints and manages codes
//! - [`Code`] - A redirect unit with a live scan counter
//!
//! Creation inputs use separate structs ([`NewCode`], [`NewCodeBatch`]) so that
//! store-assigned fields (`id`, `scan_count`, `created_at`) can never be supplied
//! by callers.
//!
//! The association is one-directional: a [`Code`] carries its `owner_id`, an
//! [`Owner`] holds no list of codes. Reverse lookups go through
//! [`crate::domain::repositories::CodeRepository::list_by_owner`].

pub mod code;
pub mod owner;

pub use code::{Code, NewCode, NewCodeBatch};
pub use owner::Owner;
