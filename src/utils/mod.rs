//! Utility functions shared across layers.
//!
//! - [`token_minter`] - Redirect token minting and shape checks
//! - [`target_url`] - Redirect destination validation

pub mod target_url;
pub mod token_minter;
