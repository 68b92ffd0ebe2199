//! Media assets referenced by learning content.
//!
//! The [`AssetManifest`] maps logical asset names to their location in the
//! legacy tree and to their path inside a built pack.

pub mod manifest;

pub use manifest::{output_path, AssetCategory, AssetEntry, AssetManifest};
