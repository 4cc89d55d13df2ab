//! Storage for rendered QR code images.
//!
//! - [`FsAssetStore`] - Renders SVG files into a directory served under `/static/qrs`

mod fs_asset_store;

pub use fs_asset_store::FsAssetStore;
