//! Engine runtime asset layout
//!
//! Bundles place the engine assets either at the bundle root or under an
//! `openalpr/` prefix. Both layouts stage into `<data_dir>/openalpr/`.

use super::source::AssetSource;
use super::stager::{join_asset_path, AssetStager, StageReport};
use anpr_types::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory name used both as bundle prefix and staging directory
pub const VENDOR_DIR: &str = "openalpr";
/// Engine configuration file
pub const CONFIG_FILE: &str = "openalpr.conf";
/// Engine model / data tree
pub const RUNTIME_DIR: &str = "runtime_data";
/// Image used to warm up the engine when no frame is available
pub const FALLBACK_IMAGE: &str = "no-plate-large.jpg";

/// Locations of the staged assets the engine is seeded with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    pub config_file: PathBuf,
    pub runtime_dir: PathBuf,
    pub fallback_image: PathBuf,
}

impl AssetPaths {
    /// Paths inside a staging directory, whether or not they exist yet
    pub fn under(data_dir: &Path) -> Self {
        let app_dir = data_dir.join(VENDOR_DIR);
        Self {
            config_file: app_dir.join(CONFIG_FILE),
            runtime_dir: app_dir.join(RUNTIME_DIR),
            fallback_image: app_dir.join(FALLBACK_IMAGE),
        }
    }
}

/// First bundle location holding `name`: the root, then the vendor prefix
fn locate<S: AssetSource + ?Sized>(source: &S, name: &str) -> Option<String> {
    [name.to_string(), join_asset_path(VENDOR_DIR, name)]
        .into_iter()
        .find(|candidate| source.exists(candidate))
}

/// Stage the config file, runtime data tree and fallback image
pub fn stage_runtime_assets<S: AssetSource + ?Sized>(
    source: &S,
    data_dir: &Path,
) -> (AssetPaths, StageReport) {
    let paths = AssetPaths::under(data_dir);
    let mut report = StageReport::default();

    let app_dir = data_dir.join(VENDOR_DIR);
    if !app_dir.is_dir() {
        if let Err(e) = fs::create_dir_all(&app_dir) {
            tracing::error!(dir = %app_dir.display(), error = %e, "cannot create asset directory");
            report.failures.push(Error::AssetCopy {
                path: VENDOR_DIR.to_string(),
                source: e,
            });
            return (paths, report);
        }
        report.dirs_created += 1;
    }

    let stager = AssetStager::new(source);
    let targets = [
        (CONFIG_FILE, &paths.config_file),
        (RUNTIME_DIR, &paths.runtime_dir),
        (FALLBACK_IMAGE, &paths.fallback_image),
    ];

    for (name, destination) in targets {
        match locate(source, name) {
            Some(found) => {
                tracing::debug!(asset = %found, "staging runtime asset");
                report.merge(stager.materialize(&found, destination));
            }
            None => {
                tracing::warn!(asset = name, "runtime asset missing from bundle");
                report.failures.push(Error::AssetCopy {
                    path: name.to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "not in asset bundle"),
                });
            }
        }
    }

    tracing::info!(
        files = report.files_copied,
        failures = report.failures.len(),
        dir = %app_dir.display(),
        "runtime assets staged"
    );
    (paths, report)
}
