//! Startup wiring: stage assets once, then build the gateway on top of them

use crate::config::Config;
use crate::gateway::EngineGateway;
use anpr_infra::assets::{stage_runtime_assets, AssetPaths, AssetSource, StageReport};
use anpr_infra::engine::CommandEngine;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

/// Result of the one staging pass
#[derive(Debug)]
pub struct StagedAssets {
    pub paths: AssetPaths,
    pub report: StageReport,
}

/// Stages runtime assets into a data directory at most once
pub struct AssetBootstrap {
    data_dir: PathBuf,
    staged: OnceCell<StagedAssets>,
}

impl AssetBootstrap {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            staged: OnceCell::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Stage from `source` on first call; later calls return the first result
    pub fn stage<S: AssetSource + ?Sized>(&self, source: &S) -> &StagedAssets {
        self.staged.get_or_init(|| {
            let (paths, report) = stage_runtime_assets(source, &self.data_dir);
            if !report.is_clean() {
                tracing::warn!(failures = report.failures.len(), "asset staging incomplete");
            }
            StagedAssets { paths, report }
        })
    }

    /// Staged assets, if staging has happened
    pub fn staged(&self) -> Option<&StagedAssets> {
        self.staged.get()
    }
}

/// Gateway over the external recognizer command, with the configured
/// defaults queued ahead of initialization
pub fn open_command_gateway(config: &Config, paths: &AssetPaths) -> EngineGateway<CommandEngine> {
    let gateway = EngineGateway::new(CommandEngine::new(config.engine_command.clone(), paths.clone()));

    if config.detect_region {
        gateway.set_detect_region(true);
    }
    if let Some(ref prewarp) = config.prewarp {
        gateway.set_prewarp(prewarp.clone());
    }
    gateway
}
