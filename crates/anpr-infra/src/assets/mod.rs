//! Runtime asset staging
//!
//! The engine needs its configuration file and data tree on writable
//! storage, but they ship inside a read-only bundle. This module mirrors the
//! bundle into a data directory.

mod layout;
mod source;
mod stager;

pub use layout::{stage_runtime_assets, AssetPaths, CONFIG_FILE, FALLBACK_IMAGE, RUNTIME_DIR, VENDOR_DIR};
pub use source::{AssetNode, AssetSource, FsAssetSource};
pub use stager::{join_asset_path, staged_files, AssetStager, StageReport};
