//! Error types for the ANPR bootstrap gate

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failed to stage one asset node. Never aborts the surrounding walk.
    #[error("Failed to copy asset {path}: {source}")]
    AssetCopy {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The gateway went away before a queued recognition could run.
    #[error("Recognition handle dropped before completion")]
    HandleDropped,

    #[error("Recognition result was already taken from this handle")]
    ResultTaken,
}

pub type Result<T> = std::result::Result<T, Error>;
