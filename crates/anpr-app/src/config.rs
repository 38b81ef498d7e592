//! Configuration management for the ANPR gate
//!
//! Config stored at: ~/.config/anpr-gate/config.json

use anpr_domain::InitParams;
use anpr_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "anpr-gate";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Country / locale code passed to engine initialization
    #[serde(default = "default_country")]
    pub country: String,

    /// Ranked readings per plate
    #[serde(default = "default_top_n")]
    pub top_n: u32,

    /// Default region pattern (optional)
    #[serde(default)]
    pub default_region: Option<String>,

    /// Let the engine detect the plate region
    #[serde(default)]
    pub detect_region: bool,

    /// Perspective pre-warp transform (optional)
    #[serde(default)]
    pub prewarp: Option<String>,

    /// Directory holding the packaged engine assets
    #[serde(default)]
    pub asset_source: Option<PathBuf>,

    /// Writable directory the assets are staged into
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// External recognizer command
    #[serde(default = "default_engine_command")]
    pub engine_command: String,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
}

fn default_country() -> String {
    "us".to_string()
}

fn default_top_n() -> u32 {
    10
}

fn default_engine_command() -> String {
    "alpr".to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

impl Default for Config {
    fn default() -> Self {
        Self {
            country: default_country(),
            top_n: default_top_n(),
            default_region: None,
            detect_region: false,
            prewarp: None,
            asset_source: None,
            data_dir: None,
            engine_command: default_engine_command(),
            output_format: default_output_format(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the staging directory path
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(data_dir)
    }

    /// Engine initialization parameters
    pub fn init_params(&self) -> InitParams {
        let mut params = InitParams::new(self.country.clone()).with_top_n(self.top_n);
        if let Some(ref region) = self.default_region {
            params = params.with_default_region(region.clone());
        }
        params
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path, or create default
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ANPR Gate Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Country:        {}", self.country)?;
        writeln!(f, "Top N:          {}", self.top_n)?;
        writeln!(
            f,
            "Default region: {}",
            self.default_region.as_deref().unwrap_or("(none)")
        )?;
        writeln!(f, "Detect region:  {}", self.detect_region)?;
        writeln!(
            f,
            "Prewarp:        {}",
            self.prewarp.as_deref().unwrap_or("(none)")
        )?;
        writeln!(
            f,
            "Asset source:   {}",
            self.asset_source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string())
        )?;
        writeln!(
            f,
            "Data dir:       {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Engine command: {}", self.engine_command)?;
        writeln!(f, "Output format:  {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}
